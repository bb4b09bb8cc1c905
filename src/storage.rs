use crate::error::StoreError;
use crate::group::{DataGroup, DecodeMode};
use crate::node::Node;
use crate::parser::{self, MAX_NESTING};
use crate::printer;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

pub fn read_node(path: impl AsRef<Path>) -> Result<Node, StoreError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    log::debug!("read {} bytes from {}", text.len(), path.display());
    parser::parse(&text)
}

/// Writes through `<path>.tmp` and a rename. Trees deeper than the parser
/// accepts are refused before anything touches the disk.
pub fn write_node(path: impl AsRef<Path>, node: &Node) -> Result<(), StoreError> {
    let path = path.as_ref();
    let depth = node.depth();
    if depth > MAX_NESTING {
        return Err(StoreError::TooDeep {
            depth,
            limit: MAX_NESTING,
        });
    }
    let mut text = printer::print(node, true);
    text.push('\n');

    let tmp = tmp_path(path);
    fs::write(&tmp, &text)?;
    if let Err(err) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(err.into());
    }
    log::debug!("wrote {} bytes to {}", text.len(), path.display());
    Ok(())
}

pub fn exists(path: impl AsRef<Path>) -> bool {
    path.as_ref().is_file()
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

impl DataGroup {
    pub fn load_from_disk(&mut self, path: impl AsRef<Path>) -> Result<&mut Self, StoreError> {
        self.load_from_disk_with(path, DecodeMode::Strict)
    }

    pub fn load_from_disk_with(
        &mut self,
        path: impl AsRef<Path>,
        mode: DecodeMode,
    ) -> Result<&mut Self, StoreError> {
        let node = read_node(path)?;
        self.from_node_with(&node, mode)
    }

    pub fn save_to_disk(&self, path: impl AsRef<Path>) -> Result<&Self, StoreError> {
        write_node(path, &self.to_node())?;
        Ok(self)
    }

    pub fn create_basic_save(
        &mut self,
        template_path: impl AsRef<Path>,
    ) -> Result<&mut Self, StoreError> {
        log::info!(
            "seeding save from template {}",
            template_path.as_ref().display()
        );
        self.load_from_disk(template_path)
    }
}
