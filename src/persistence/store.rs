//! File layout under the data directory:
//!
//! ```text
//! saves/world{id}.bin     player save for world {id}
//! worlds/w{id}/world.bin  world template
//! worlds/w{id}/d{n}.bin   n-th dungeon of that world
//! ```
//!
//! Dungeon order comes from `n`, never from directory listing order.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::game::world::World;
use crate::persistence::envelope;
use crate::persistence::player_save::PlayerSave;
use crate::persistence::world_save::{DungeonSave, WorldSave};
use crate::{AppError, AppResult};

pub struct SaveStore {
    root: PathBuf,
}

impl SaveStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn saves_dir(&self) -> PathBuf {
        self.root.join("saves")
    }

    pub fn player_path(&self, world_id: u32) -> PathBuf {
        self.saves_dir().join(format!("world{}.bin", world_id))
    }

    pub fn world_dir(&self, world_id: u32) -> PathBuf {
        self.root.join("worlds").join(format!("w{}", world_id))
    }

    pub fn world_path(&self, world_id: u32) -> PathBuf {
        self.world_dir(world_id).join("world.bin")
    }

    pub fn dungeon_path(&self, world_id: u32, index: usize) -> PathBuf {
        self.world_dir(world_id).join(format!("d{}.bin", index))
    }

    pub fn save_player(&self, save: &PlayerSave) -> AppResult<PathBuf> {
        let path = self.player_path(save.save_base);
        write_envelope(&path, save)?;
        tracing::info!("💾 Saved player '{}' to {}", save.save_name, path.display());
        Ok(path)
    }

    pub fn load_player(&self, world_id: u32) -> AppResult<PlayerSave> {
        let save: PlayerSave = read_envelope(&self.player_path(world_id))?;
        tracing::debug!("Loaded player save '{}' for world {}", save.save_name, world_id);
        Ok(save)
    }

    pub fn delete_player(&self, world_id: u32) -> AppResult<()> {
        let path = self.player_path(world_id);
        fs::remove_file(&path).map_err(|e| AppError::from_io(&path, e))
    }

    /// Every readable player save, ordered by world id. Corrupt files are skipped.
    pub fn list_player_saves(&self) -> AppResult<Vec<PlayerSave>> {
        let dir = self.saves_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut indexed = Vec::new();
        for (world_id, path) in numbered_files(&dir, "world")? {
            match read_envelope::<PlayerSave>(&path) {
                Ok(save) => indexed.push((world_id, save)),
                Err(e) => tracing::warn!("Skipping player save {}: {}", path.display(), e),
            }
        }
        indexed.sort_by_key(|(world_id, _)| *world_id);
        Ok(indexed.into_iter().map(|(_, save)| save).collect())
    }

    pub fn save_world(&self, world: &World) -> AppResult<()> {
        let dir = self.world_dir(world.id());
        write_envelope(&self.world_path(world.id()), &WorldSave::from_world(world))?;

        for (index, dungeon) in world.dungeons().iter().enumerate() {
            write_envelope(
                &self.dungeon_path(world.id(), index),
                &DungeonSave::from_template(dungeon),
            )?;
        }

        for (index, path) in numbered_files(&dir, "d")? {
            if index >= world.dungeons().len() {
                fs::remove_file(&path).map_err(|e| AppError::from_io(&path, e))?;
                tracing::debug!("Removed stale dungeon file {}", path.display());
            }
        }

        tracing::info!(
            "🌍 Saved world {} with {} dungeons to {}",
            world.id(),
            world.dungeons().len(),
            dir.display()
        );
        Ok(())
    }

    /// Loads a world and its dungeons. A dungeon file that cannot be read,
    /// decoded or resolved is skipped with a warning.
    pub fn load_world(&self, world_id: u32) -> AppResult<World> {
        let world_path = self.world_path(world_id);
        if !world_path.exists() {
            return Err(AppError::WorldNotFound { world_id });
        }
        let save: WorldSave = read_envelope(&world_path)?;
        let mut world = save.to_world()?;

        let mut dungeon_files = numbered_files(&self.world_dir(world_id), "d")?;
        dungeon_files.sort_by_key(|(index, _)| *index);

        for (index, path) in dungeon_files {
            let loaded = read_envelope::<DungeonSave>(&path)
                .and_then(|dungeon| dungeon.to_template(world.catalog()))
                .and_then(|template| world.add_dungeon(template));
            if let Err(e) = loaded {
                tracing::warn!("Skipping dungeon #{} ({}): {}", index, path.display(), e);
            }
        }

        tracing::info!(
            "🌍 Loaded world {} '{}' with {} dungeons",
            world.id(),
            world.template_name(),
            world.dungeons().len()
        );
        Ok(world)
    }
}

/// Parses the numeric suffix of names like `d3.bin` or `world12.bin`.
pub fn parse_numbered_name(file_name: &str, prefix: &str) -> AppResult<usize> {
    file_name
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_suffix(".bin"))
        .and_then(|number| number.parse().ok())
        .ok_or_else(|| AppError::UnparseableFileName {
            file_name: file_name.to_string(),
        })
}

/// Lists `{prefix}{n}.bin` files in `dir`. Other `.bin` files with the same
/// prefix are reported and skipped.
fn numbered_files(dir: &Path, prefix: &str) -> AppResult<Vec<(usize, PathBuf)>> {
    let entries = fs::read_dir(dir).map_err(|e| AppError::from_io(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| AppError::from_io(dir, e))?;
        let path = entry.path();
        let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        if !file_name.starts_with(prefix) || !file_name.ends_with(".bin") {
            continue;
        }
        match parse_numbered_name(file_name, prefix) {
            Ok(index) => files.push((index, path.clone())),
            Err(e) => tracing::warn!("Ignoring {}: {}", path.display(), e),
        }
    }
    Ok(files)
}

fn write_envelope<T: Serialize>(path: &Path, value: &T) -> AppResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| AppError::from_io(parent, e))?;
    }
    let bytes = envelope::encode(value)?;
    let temp_path = path.with_extension("bin.tmp");
    fs::write(&temp_path, bytes).map_err(|e| AppError::from_io(&temp_path, e))?;
    fs::rename(&temp_path, path).map_err(|e| AppError::from_io(path, e))?;
    Ok(())
}

fn read_envelope<T: DeserializeOwned>(path: &Path) -> AppResult<T> {
    let bytes = fs::read(path).map_err(|e| AppError::from_io(path, e))?;
    envelope::decode(&bytes)
}
