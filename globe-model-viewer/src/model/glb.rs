//! Minimal GLB container reader for the node table.
//!
//! Only the JSON chunk is decoded. Geometry, buffers and materials are left to
//! Bevy's glTF loader; this table exists so the inspector can name what was
//! clicked.

use bytemuck::{Pod, Zeroable};
use serde::Deserialize;
use thiserror::Error;

const GLB_MAGIC: u32 = 0x4654_6C67; // "glTF"
const GLB_VERSION: u32 = 2;
const CHUNK_TYPE_JSON: u32 = 0x4E4F_534A; // "JSON"

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct GlbHeader {
    magic: u32,
    version: u32,
    length: u32,
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct ChunkHeader {
    length: u32,
    chunk_type: u32,
}

#[derive(Debug, Error)]
pub enum GlbError {
    #[error("file is too short to be a GLB container")]
    Truncated,
    #[error("missing glTF magic")]
    BadMagic,
    #[error("unsupported GLB version {0}")]
    UnsupportedVersion(u32),
    #[error("first chunk is not JSON")]
    MissingJsonChunk,
    #[error("invalid glTF JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Deserialize)]
struct GltfDocument {
    #[serde(default)]
    nodes: Vec<GltfNode>,
    #[serde(default)]
    scenes: Vec<GltfScene>,
    scene: Option<usize>,
}

#[derive(Deserialize)]
struct GltfNode {
    name: Option<String>,
    #[serde(default)]
    children: Vec<usize>,
    matrix: Option<Vec<f64>>,
    translation: Option<Vec<f64>>,
    rotation: Option<Vec<f64>>,
    scale: Option<Vec<f64>>,
}

#[derive(Deserialize)]
struct GltfScene {
    #[serde(default)]
    nodes: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRecord {
    pub name: Option<String>,
    pub children: Vec<usize>,
    pub has_local_transform: bool,
}

/// Nodes of a glTF document plus the roots of the scene that gets spawned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeTable {
    pub nodes: Vec<NodeRecord>,
    pub scene_roots: Vec<usize>,
}

impl NodeTable {
    pub fn parse(bytes: &[u8]) -> Result<Self, GlbError> {
        let header_size = size_of::<GlbHeader>();
        let chunk_size = size_of::<ChunkHeader>();
        if bytes.len() < header_size + chunk_size {
            return Err(GlbError::Truncated);
        }

        let header: GlbHeader = bytemuck::pod_read_unaligned(&bytes[..header_size]);
        if u32::from_le(header.magic) != GLB_MAGIC {
            return Err(GlbError::BadMagic);
        }
        let version = u32::from_le(header.version);
        if version != GLB_VERSION {
            return Err(GlbError::UnsupportedVersion(version));
        }

        let chunk: ChunkHeader =
            bytemuck::pod_read_unaligned(&bytes[header_size..header_size + chunk_size]);
        if u32::from_le(chunk.chunk_type) != CHUNK_TYPE_JSON {
            return Err(GlbError::MissingJsonChunk);
        }

        let start = header_size + chunk_size;
        let end = start + u32::from_le(chunk.length) as usize;
        let json = bytes.get(start..end).ok_or(GlbError::Truncated)?;

        let document: GltfDocument = serde_json::from_slice(json)?;
        Ok(Self::from_document(document))
    }

    fn from_document(document: GltfDocument) -> Self {
        let nodes: Vec<NodeRecord> = document
            .nodes
            .into_iter()
            .map(|node| NodeRecord {
                has_local_transform: node.matrix.is_some()
                    || node.translation.is_some()
                    || node.rotation.is_some()
                    || node.scale.is_some(),
                name: node.name,
                children: node.children,
            })
            .collect();

        let scene_index = document.scene.unwrap_or(0);
        let scene_roots = match document.scenes.get(scene_index) {
            Some(scene) => scene.nodes.clone(),
            None => {
                // No scenes: every node that is nobody's child is a root.
                let mut is_child = vec![false; nodes.len()];
                for child in nodes.iter().flat_map(|node| node.children.iter()) {
                    if let Some(flag) = is_child.get_mut(*child) {
                        *flag = true;
                    }
                }
                (0..nodes.len()).filter(|index| !is_child[*index]).collect()
            }
        };

        Self { nodes, scene_roots }
    }

    pub fn node(&self, index: usize) -> Option<&NodeRecord> {
        self.nodes.get(index)
    }

    pub fn node_name(&self, index: usize) -> Option<&str> {
        self.node(index).and_then(|node| node.name.as_deref())
    }

    /// Name Bevy's glTF loader gives the entity spawned for this node.
    pub fn spawn_name(&self, index: usize) -> String {
        self.node_name(index)
            .map(str::to_owned)
            .unwrap_or_else(|| format!("GltfNode{index}"))
    }

    /// Pre-order walk of the spawned scene, children in document order.
    pub fn depth_first_order(&self) -> Vec<usize> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut visited = vec![false; self.nodes.len()];
        let mut stack: Vec<usize> = self.scene_roots.iter().rev().copied().collect();

        while let Some(index) = stack.pop() {
            let Some(node) = self.nodes.get(index) else {
                continue;
            };
            if std::mem::replace(&mut visited[index], true) {
                continue;
            }
            order.push(index);
            stack.extend(node.children.iter().rev().copied());
        }

        order
    }
}

#[cfg(test)]
pub(crate) fn glb_from_json(json: &str) -> Vec<u8> {
    let mut json = json.as_bytes().to_vec();
    while json.len() % 4 != 0 {
        json.push(b' ');
    }

    let total = 12 + 8 + json.len();
    let mut bytes = Vec::with_capacity(total);
    bytes.extend_from_slice(&GLB_MAGIC.to_le_bytes());
    bytes.extend_from_slice(&GLB_VERSION.to_le_bytes());
    bytes.extend_from_slice(&(total as u32).to_le_bytes());
    bytes.extend_from_slice(&(json.len() as u32).to_le_bytes());
    bytes.extend_from_slice(&CHUNK_TYPE_JSON.to_le_bytes());
    bytes.extend_from_slice(&json);
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "asset": {"version": "2.0"},
        "scene": 0,
        "scenes": [{"nodes": [0, 3]}],
        "nodes": [
            {"name": "Building", "children": [1, 2], "translation": [0, 1, 0]},
            {"name": "Roof", "mesh": 0},
            {"mesh": 1, "matrix": [1,0,0,0, 0,1,0,0, 0,0,1,0, 0,0,0,1]},
            {"name": "Sign"}
        ]
    }"#;

    #[test]
    fn test_parse_reads_nodes_and_scene_roots() {
        let table = NodeTable::parse(&glb_from_json(SAMPLE)).unwrap();

        assert_eq!(table.nodes.len(), 4);
        assert_eq!(table.scene_roots, vec![0, 3]);
        assert_eq!(table.node_name(1), Some("Roof"));
        assert_eq!(table.node_name(2), None);
        assert!(table.node(0).unwrap().has_local_transform);
        assert!(!table.node(1).unwrap().has_local_transform);
        assert!(table.node(2).unwrap().has_local_transform);
    }

    #[test]
    fn test_spawn_names_fall_back_to_index() {
        let table = NodeTable::parse(&glb_from_json(SAMPLE)).unwrap();
        assert_eq!(table.spawn_name(0), "Building");
        assert_eq!(table.spawn_name(2), "GltfNode2");
    }

    #[test]
    fn test_depth_first_order_follows_children() {
        let table = NodeTable::parse(&glb_from_json(SAMPLE)).unwrap();
        assert_eq!(table.depth_first_order(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_roots_inferred_without_scenes() {
        let json = r#"{"nodes": [{"children": [2]}, {"name": "Loose"}, {"name": "Leaf"}]}"#;
        let table = NodeTable::parse(&glb_from_json(json)).unwrap();
        assert_eq!(table.scene_roots, vec![0, 1]);
        assert_eq!(table.depth_first_order(), vec![0, 2, 1]);
    }

    #[test]
    fn test_rejects_non_glb_bytes() {
        assert!(matches!(
            NodeTable::parse(b"plain text, definitely not binary glTF"),
            Err(GlbError::BadMagic)
        ));
        assert!(matches!(NodeTable::parse(b"glTF"), Err(GlbError::Truncated)));
    }

    #[test]
    fn test_rejects_chunk_longer_than_file() {
        let mut bytes = glb_from_json(SAMPLE);
        bytes.truncate(bytes.len() - 8);
        assert!(matches!(NodeTable::parse(&bytes), Err(GlbError::Truncated)));
    }

    #[test]
    fn test_rejects_malformed_json() {
        let bytes = glb_from_json("{\"nodes\": [");
        assert!(matches!(NodeTable::parse(&bytes), Err(GlbError::Json(_))));
    }
}
