use std::path::{Path, PathBuf};

use percent_encoding::percent_decode_str;

/// Directory that relative URIs inside `scene_path` are resolved against.
pub fn base_dir(scene_path: &Path) -> PathBuf {
    match scene_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("./"),
    }
}

/// Joins a document URI onto the base directory.
///
/// URIs are percent-encoded and always use `/`; `Path::join` accepts that on
/// every platform once the escapes are decoded.
pub fn resolve_uri(base_dir: &Path, uri: &str) -> PathBuf {
    let decoded = percent_decode_str(uri).decode_utf8_lossy();
    base_dir.join(&*decoded)
}

pub fn is_data_uri(uri: &str) -> bool {
    uri.starts_with("data:")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_dir_of_nested_file() {
        assert_eq!(base_dir(Path::new("assets/box/box.gltf")), PathBuf::from("assets/box"));
    }

    #[test]
    fn base_dir_of_bare_file_is_current_dir() {
        assert_eq!(base_dir(Path::new("box.gltf")), PathBuf::from("./"));
    }

    #[test]
    fn resolves_relative_uri() {
        let base = base_dir(Path::new("assets/box/box.gltf"));
        assert_eq!(
            resolve_uri(&base, "textures/albedo.png"),
            PathBuf::from("assets/box/textures/albedo.png")
        );
    }

    #[test]
    fn percent_escapes_are_decoded() {
        assert_eq!(
            resolve_uri(Path::new("assets"), "my%20mesh.bin"),
            PathBuf::from("assets/my mesh.bin")
        );
        assert_eq!(
            resolve_uri(Path::new("assets"), "sub%2Fdir/caf%C3%A9.png"),
            PathBuf::from("assets/sub/dir/café.png")
        );
    }

    #[test]
    fn detects_data_uris() {
        assert!(is_data_uri("data:application/octet-stream;base64,AAAA"));
        assert!(!is_data_uri("box.bin"));
    }
}
