use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

const TMP_SUFFIX: &str = "catalog-tmp";

/// Creates the parent directory of `path` when it has one.
pub fn ensure_parent_dir(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

/// Sibling path used to stage a rewrite, e.g. `movies.json.catalog-tmp`.
/// Any existing file with that name is overwritten and then removed.
pub fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

/// Replaces the file at `path` with `data` by staging to a temporary file and
/// renaming it over the target, so readers never observe a partial write.
pub fn write_atomic(path: &Path, data: &[u8]) -> std::io::Result<()> {
    ensure_parent_dir(path)?;
    let tmp = tmp_path(path);
    let staged = File::create(&tmp).and_then(|mut file| {
        file.write_all(data)?;
        file.sync_all()
    });
    if let Err(err) = staged.and_then(|_| fs::rename(&tmp, path)) {
        let _ = fs::remove_file(&tmp);
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn tmp_path_keeps_original_extension() {
        assert_eq!(
            tmp_path(Path::new("data/movies.json")),
            PathBuf::from("data/movies.json.catalog-tmp")
        );
        assert_eq!(
            tmp_path(Path::new("movies")),
            PathBuf::from("movies.catalog-tmp")
        );
    }

    #[test]
    fn write_atomic_creates_missing_directories() {
        let temp = TempDir::new().expect("temp dir");
        let target = temp.path().join("nested").join("deeper").join("movies.csv");
        write_atomic(&target, b"title,year,rating,poster\n").expect("write file");
        assert_eq!(
            fs::read_to_string(&target).expect("read back"),
            "title,year,rating,poster\n"
        );
        assert!(!tmp_path(&target).exists());
    }

    #[test]
    fn plain_tmp_file_next_to_target_is_left_alone() {
        let temp = TempDir::new().expect("temp dir");
        let target = temp.path().join("movies.json");
        let neighbour = temp.path().join("movies.json.tmp");
        fs::write(&neighbour, b"keep me").expect("write neighbour");

        write_atomic(&target, b"{}\n").expect("write file");

        assert_eq!(fs::read(&neighbour).expect("neighbour survives"), b"keep me");
    }

    #[test]
    fn ensure_parent_dir_accepts_bare_file_names() {
        ensure_parent_dir(Path::new("movies.json")).expect("no parent to create");
    }
}
