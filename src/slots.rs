use crate::group::DataGroup;
use anyhow::{Context, Result, anyhow};
use std::fs;
use std::path::{Path, PathBuf};

pub const SAVE_DIR: &str = "save";
pub const GLOBAL_FILE: &str = "global.json";
pub const LAST_SLOT_KEY: &str = "slot";

pub struct SaveSlots {
    data_dir: PathBuf,
    template: PathBuf,
    pub save: DataGroup,
    pub global: DataGroup,
    /// Session-only state; never written to disk.
    pub temp: DataGroup,
    backups: Vec<DataGroup>,
    saved_digest: Option<[u8; 32]>,
}

impl SaveSlots {
    pub fn new(data_dir: impl Into<PathBuf>, template: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            template: template.into(),
            save: DataGroup::new(),
            global: DataGroup::new(),
            temp: DataGroup::new(),
            backups: Vec::new(),
            saved_digest: None,
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn save_dir(&self) -> PathBuf {
        self.data_dir.join(SAVE_DIR)
    }

    pub fn slot_path(&self, slot: u32) -> PathBuf {
        self.save_dir().join(format!("slot{}.json", slot))
    }

    pub fn global_path(&self) -> PathBuf {
        self.save_dir().join(GLOBAL_FILE)
    }

    pub fn slot_exists(&self, slot: u32) -> bool {
        crate::storage::exists(self.slot_path(slot))
    }

    pub fn slots(&self) -> Result<Vec<u32>> {
        let dir = self.save_dir();
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut out = Vec::new();
        let entries = fs::read_dir(&dir)
            .with_context(|| format!("Failed to list save directory: {}", dir.display()))?;
        for entry in entries {
            let entry = entry?;
            let name = entry.file_name();
            let slot = name
                .to_str()
                .and_then(|n| n.strip_prefix("slot"))
                .and_then(|n| n.strip_suffix(".json"))
                .and_then(|n| n.parse::<u32>().ok());
            if let Some(slot) = slot {
                out.push(slot);
            }
        }
        out.sort_unstable();
        Ok(out)
    }

    pub fn load_slot(&mut self, slot: u32) -> Result<()> {
        let path = self.slot_path(slot);
        self.save
            .load_from_disk(&path)
            .with_context(|| format!("Failed to load slot {} from {}", slot, path.display()))?;
        self.saved_digest = Some(self.save.digest());
        log::info!("loaded slot {}", slot);
        Ok(())
    }

    pub fn save_slot(&mut self, slot: u32) -> Result<()> {
        self.ensure_save_dir()?;
        let path = self.slot_path(slot);
        self.save
            .save_to_disk(&path)
            .with_context(|| format!("Failed to save slot {} to {}", slot, path.display()))?;
        self.saved_digest = Some(self.save.digest());

        let slot_value =
            i32::try_from(slot).map_err(|_| anyhow!("slot number {} is out of range", slot))?;
        self.global.set(LAST_SLOT_KEY, slot_value)?;
        self.save_global()?;
        log::info!("saved slot {}", slot);
        Ok(())
    }

    pub fn new_slot(&mut self, slot: u32) -> Result<()> {
        self.save
            .create_basic_save(&self.template)
            .with_context(|| format!("Failed to read template: {}", self.template.display()))?;
        self.save_slot(slot)
    }

    pub fn delete_slot(&mut self, slot: u32) -> Result<bool> {
        let path = self.slot_path(slot);
        if !path.is_file() {
            return Ok(false);
        }
        fs::remove_file(&path)
            .with_context(|| format!("Failed to delete slot file: {}", path.display()))?;
        if self.last_slot() == Some(slot) {
            self.global.remove(LAST_SLOT_KEY);
            self.save_global()?;
        }
        log::info!("deleted slot {}", slot);
        Ok(true)
    }

    /// Loads the global file. A missing file means a first run and yields
    /// an empty group.
    pub fn load_global(&mut self) -> Result<()> {
        let path = self.global_path();
        if !path.is_file() {
            log::info!("no global save at {}, starting empty", path.display());
            self.global.clear();
            return Ok(());
        }
        self.global
            .load_from_disk(&path)
            .with_context(|| format!("Failed to load global save: {}", path.display()))?;
        Ok(())
    }

    pub fn save_global(&self) -> Result<()> {
        self.ensure_save_dir()?;
        let path = self.global_path();
        self.global
            .save_to_disk(&path)
            .with_context(|| format!("Failed to write global save: {}", path.display()))?;
        Ok(())
    }

    pub fn last_slot(&self) -> Option<u32> {
        self.global
            .get::<i32>(LAST_SLOT_KEY)
            .and_then(|slot| u32::try_from(slot).ok())
    }

    pub fn save_backup(&mut self, index: usize) {
        if self.backups.len() <= index {
            self.backups.resize_with(index + 1, DataGroup::new);
        }
        self.backups[index].copy_from(&self.save);
        log::debug!("stored backup {}", index);
    }

    pub fn load_backup(&mut self, index: usize) -> Result<()> {
        let backup = self
            .backups
            .get(index)
            .ok_or_else(|| anyhow!("no backup at index {}", index))?;
        self.save.copy_from(backup);
        log::debug!("restored backup {}", index);
        Ok(())
    }

    pub fn backup(&self, index: usize) -> Option<&DataGroup> {
        self.backups.get(index)
    }

    pub fn is_dirty(&self) -> bool {
        match self.saved_digest {
            Some(digest) => digest != self.save.digest(),
            None => !self.save.is_empty(),
        }
    }

    fn ensure_save_dir(&self) -> Result<()> {
        let dir = self.save_dir();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create save directory: {}", dir.display()))
    }
}
