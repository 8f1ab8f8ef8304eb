// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Dataset splitting into train/test directory trees.
//!
//! The source layout is one subdirectory per pose class. Each class's
//! images are shuffled with a seeded RNG and partitioned by the train
//! ratio; files are copied, never moved, so the source stays intact.

use std::fs;
use std::path::Path;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::error::{PreprocessError, Result};
use crate::warn;

/// Image file extensions accepted by the pipeline.
pub const IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "JPG", "JPEG", "PNG"];

/// Per-class outcome of a dataset split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassSplit {
    /// Class (subdirectory) name.
    pub class_name: String,
    /// Number of images copied into the train split.
    pub train: usize,
    /// Number of images copied into the test split.
    pub test: usize,
}

/// List class subdirectories of a dataset root, sorted by name.
///
/// The sort is what assigns class ordinals everywhere downstream, so it is
/// explicit here rather than left to filesystem enumeration order.
///
/// # Errors
///
/// Returns an error if the root doesn't exist or isn't a directory.
pub fn list_pose_classes<P: AsRef<Path>>(root: P) -> Result<Vec<String>> {
    let root = root.as_ref();
    if !root.is_dir() {
        return Err(PreprocessError::SplitError(format!(
            "Not a directory: {}",
            root.display()
        )));
    }

    let mut classes: Vec<String> = fs::read_dir(root)?
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.path().is_dir())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();

    classes.sort();
    Ok(classes)
}

/// Collect image filenames in a directory, sorted.
///
/// # Errors
///
/// Returns an error if the directory can't be read.
pub fn collect_image_names<P: AsRef<Path>>(dir: P) -> Result<Vec<String>> {
    let mut names: Vec<String> = fs::read_dir(dir.as_ref())?
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|path| is_image_file(path))
        .filter_map(|path| {
            path.file_name()
                .map(|name| name.to_string_lossy().into_owned())
        })
        .collect();

    names.sort();
    Ok(names)
}

/// Check if a path is an image file based on extension.
fn is_image_file(path: &Path) -> bool {
    path.is_file()
        && path.extension().is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|accepted| ext.to_string_lossy() == *accepted)
        })
}

/// Split a source dataset into `<dest>/train` and `<dest>/test` trees.
///
/// For each class, filenames are shuffled with `StdRng::seed_from_u64(seed)`
/// and the first `floor(train_ratio * n)` go to the train split, the rest
/// to the test split. Classes without images are skipped with a warning.
///
/// # Errors
///
/// Returns an error if the source is missing or any directory creation or
/// file copy fails. Copy failures are fatal to the whole run.
pub fn split_dataset<P: AsRef<Path>, Q: AsRef<Path>>(
    source: P,
    dest: Q,
    train_ratio: f32,
    seed: u64,
) -> Result<Vec<ClassSplit>> {
    let source = source.as_ref();
    let dest = dest.as_ref();

    let classes = list_pose_classes(source)?;
    let train_root = dest.join("train");
    let test_root = dest.join("test");
    fs::create_dir_all(&train_root)?;
    fs::create_dir_all(&test_root)?;

    let mut rng = StdRng::seed_from_u64(seed);
    let mut summaries = Vec::with_capacity(classes.len());

    for class_name in classes {
        let class_dir = source.join(&class_name);
        let mut images = collect_image_names(&class_dir)?;

        if images.is_empty() {
            warn!("No images found in {}", class_dir.display());
            continue;
        }

        images.shuffle(&mut rng);

        let split_idx = train_split_count(images.len(), train_ratio);
        let (train_images, test_images) = images.split_at(split_idx);

        let train_class_dir = train_root.join(&class_name);
        let test_class_dir = test_root.join(&class_name);
        fs::create_dir_all(&train_class_dir)?;
        fs::create_dir_all(&test_class_dir)?;

        for name in train_images {
            fs::copy(class_dir.join(name), train_class_dir.join(name))?;
        }
        for name in test_images {
            fs::copy(class_dir.join(name), test_class_dir.join(name))?;
        }

        summaries.push(ClassSplit {
            class_name,
            train: train_images.len(),
            test: test_images.len(),
        });
    }

    Ok(summaries)
}

/// Number of images assigned to the train split, `floor(train_ratio * n)`.
///
/// Computed in f64: f32 can't represent every usize class size exactly, so
/// a full-precision count is taken before flooring.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn train_split_count(n: usize, train_ratio: f32) -> usize {
    ((n as f64 * f64::from(train_ratio)).floor() as usize).min(n)
}
