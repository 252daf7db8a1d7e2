use log::debug;
use std::path::Path;
use walkdir::WalkDir;

const IMAGE_FORMATS: [&str; 6] = ["png", "jpg", "svg", "gif", "jpeg", "bmp"];

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_FORMATS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Images are often referenced without an extension. Returns the path unchanged when it exists,
/// otherwise the first image file (by name) in the same directory whose name starts with the
/// referenced one. Falls back to the path as written.
pub fn resolve_image(image_path: &str) -> String {
    let path = Path::new(image_path);
    if path.exists() {
        return image_path.to_string();
    }

    let (dir, prefix) = match (path.parent(), path.file_name().and_then(|n| n.to_str())) {
        (Some(dir), Some(prefix)) => (dir, prefix),
        _ => return image_path.to_string(),
    };
    let search_dir = if dir.as_os_str().is_empty() {
        Path::new(".")
    } else {
        dir
    };

    let found = WalkDir::new(search_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .find(|e| {
            e.file_name().to_str().map_or(false, |name| name.starts_with(prefix))
                && has_image_extension(e.path())
        });

    match found {
        Some(entry) => {
            let resolved = dir.join(entry.file_name()).to_string_lossy().into_owned();
            debug!("resolved image {image_path} to {resolved}");
            resolved
        }
        None => {
            debug!("no image file found for {image_path}");
            image_path.to_string()
        }
    }
}
