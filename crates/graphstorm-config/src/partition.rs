//! Lookups beside a graph partition config file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{ConfigError, ConfigResult};

#[derive(Debug, Deserialize)]
struct PartitionMeta {
    graph_name: String,
}

/// Which ID mapping to look for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdMapping {
    Node,
    Edge,
}

impl IdMapping {
    fn single_file(self) -> &'static str {
        match self {
            Self::Node => "node_mapping.pt",
            Self::Edge => "edge_mapping.pt",
        }
    }

    fn per_partition_file(self) -> &'static str {
        match self {
            Self::Node => "orig_nids.dgl",
            Self::Edge => "orig_eids.dgl",
        }
    }
}

/// Reads `graph_name` from the partition config JSON.
pub fn graph_name(part_config: &Path) -> ConfigResult<String> {
    let contents = fs::read_to_string(part_config)
        .map_err(|source| ConfigError::Load { path: part_config.to_path_buf(), source })?;
    let meta: PartitionMeta = serde_json::from_str(&contents)?;
    Ok(meta.graph_name)
}

/// Locates the ID mapping written by graph partitioning.
///
/// Returns the single mapping file beside the partition config when it
/// exists. Otherwise returns the partition config directory if the first
/// `part*` directory (in name order) holds a per-partition mapping, and
/// `None` if neither layout is present.
pub fn id_mapping_path(part_config: &Path, kind: IdMapping) -> ConfigResult<Option<PathBuf>> {
    let dir = part_config.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or_else(|| Path::new("."));
    let single = dir.join(kind.single_file());
    if single.is_file() {
        return Ok(Some(single));
    }

    let mut part_dirs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let name = entry?.file_name();
        if name.to_string_lossy().starts_with("part") {
            part_dirs.push(name);
        }
    }
    part_dirs.sort();

    let found = part_dirs.first().is_some_and(|first| dir.join(first).join(kind.per_partition_file()).is_file());
    Ok(found.then(|| dir.to_path_buf()))
}
