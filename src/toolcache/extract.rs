use std::path::Path;

use crate::config::TargetOs;
use crate::error::SetupError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    TarGz,
    Zip,
}

impl ArchiveFormat {
    pub fn for_os(os: TargetOs) -> Self {
        match os {
            TargetOs::Windows => ArchiveFormat::Zip,
            TargetOs::Linux | TargetOs::MacOs => ArchiveFormat::TarGz,
        }
    }
}

pub fn extract(archive: &Path, format: ArchiveFormat, dest: &Path) -> Result<(), SetupError> {
    std::fs::create_dir_all(dest)?;
    tracing::debug!(
        "extracting {} ({:?}) to {}",
        archive.display(),
        format,
        dest.display()
    );

    match format {
        ArchiveFormat::TarGz => extract_tar_gz(archive, dest),
        ArchiveFormat::Zip => extract_zip(archive, dest),
    }
}

fn extract_tar_gz(archive: &Path, dest: &Path) -> Result<(), SetupError> {
    let file = std::fs::File::open(archive)?;
    let decoder = flate2::read::GzDecoder::new(file);
    let mut tar = tar::Archive::new(decoder);
    tar.set_preserve_permissions(true);
    tar.unpack(dest)
        .map_err(|e| SetupError::Extract(format!("{}: {e}", archive.display())))
}

fn extract_zip(archive: &Path, dest: &Path) -> Result<(), SetupError> {
    let file = std::fs::File::open(archive)?;
    let mut zip = zip::ZipArchive::new(file)?;
    zip.extract(dest)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toolcache::testing::tar_gz;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn format_follows_platform() {
        assert_eq!(ArchiveFormat::for_os(TargetOs::Windows), ArchiveFormat::Zip);
        assert_eq!(ArchiveFormat::for_os(TargetOs::Linux), ArchiveFormat::TarGz);
        assert_eq!(ArchiveFormat::for_os(TargetOs::MacOs), ArchiveFormat::TarGz);
    }

    #[test]
    fn extracts_tar_gz_with_nested_dirs() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("sbt-1.5.5.tgz");
        std::fs::write(
            &archive,
            tar_gz(&[("sbt/bin/sbt", "#!/bin/sh"), ("sbt/conf/sbtopts", "-J-Xmx2G")]),
        )
        .unwrap();

        let dest = dir.path().join("out");
        extract(&archive, ArchiveFormat::TarGz, &dest).unwrap();

        assert_eq!(
            std::fs::read_to_string(dest.join("sbt").join("bin").join("sbt")).unwrap(),
            "#!/bin/sh"
        );
        assert!(dest.join("sbt").join("conf").join("sbtopts").exists());
    }

    #[test]
    fn extracts_zip() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("sbt-1.5.5.zip");
        {
            let file = std::fs::File::create(&archive).unwrap();
            let mut zip = zip::ZipWriter::new(file);
            let options = zip::write::SimpleFileOptions::default();
            zip.start_file("sbt/bin/sbt.bat", options).unwrap();
            zip.write_all(b"@echo off").unwrap();
            zip.finish().unwrap();
        }

        let dest = dir.path().join("out");
        extract(&archive, ArchiveFormat::Zip, &dest).unwrap();

        assert_eq!(
            std::fs::read_to_string(dest.join("sbt").join("bin").join("sbt.bat")).unwrap(),
            "@echo off"
        );
    }

    #[test]
    fn garbage_archive_is_an_extract_error() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("broken.zip");
        std::fs::write(&archive, b"definitely not a zip").unwrap();

        let err = extract(&archive, ArchiveFormat::Zip, &dir.path().join("out")).unwrap_err();
        assert!(matches!(err, SetupError::Extract(_)), "{err:?}");
    }

    #[test]
    fn missing_archive_is_an_io_error() {
        let dir = tempdir().unwrap();
        let err = extract(
            &dir.path().join("nope.tar.gz"),
            ArchiveFormat::TarGz,
            &dir.path().join("out"),
        )
        .unwrap_err();
        assert!(matches!(err, SetupError::Io(_)), "{err:?}");
    }
}
