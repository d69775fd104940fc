/// Joint hierarchy consumed by skinned meshes
///
/// Pose evaluation happens elsewhere: an animation system writes each joint's
/// world transform with `set_joint_transform`, and draw calls snapshot
/// `world_transform * offset` for every joint.

use glam::Mat4;
use rustc_hash::FxHashMap;
use crate::error::{Error, Result};

/// Capacity of the joint uniform block
pub const MAX_JOINTS: usize = 64;

/// One joint of a skeleton
#[derive(Debug, Clone, PartialEq)]
pub struct Joint {
    pub name: String,
    /// Parent joint index; `None` for roots
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    /// Inverse bind-pose matrix (mesh space to joint space)
    pub offset: Mat4,
    /// Current world transform
    pub transform: Mat4,
}

/// Ordered joint tree; parents always precede their children
#[derive(Debug, Clone, Default)]
pub struct Skeleton {
    joints: Vec<Joint>,
    names: FxHashMap<String, usize>,
}

impl Skeleton {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a joint and return its index
    ///
    /// # Errors
    ///
    /// `Error::InvalidResource` if the name is already used or `parent` does
    /// not name an existing joint.
    pub fn add_joint(&mut self, name: impl Into<String>, offset: Mat4, parent: Option<usize>) -> Result<usize> {
        let name = name.into();
        if self.names.contains_key(&name) {
            return Err(Error::InvalidResource(format!("duplicate joint '{}'", name)));
        }
        if let Some(parent) = parent {
            if parent >= self.joints.len() {
                return Err(Error::InvalidResource(format!(
                    "joint '{}' references parent {} but only {} joints exist",
                    name, parent, self.joints.len()
                )));
            }
        }

        let index = self.joints.len();
        if let Some(parent) = parent {
            self.joints[parent].children.push(index);
        }
        self.names.insert(name.clone(), index);
        self.joints.push(Joint {
            name,
            parent,
            children: Vec::new(),
            offset,
            transform: Mat4::IDENTITY,
        });
        Ok(index)
    }

    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    pub fn joint(&self, index: usize) -> Option<&Joint> {
        self.joints.get(index)
    }

    pub fn joint_index(&self, name: &str) -> Option<usize> {
        self.names.get(name).copied()
    }

    /// Indices of the joints without a parent
    pub fn roots(&self) -> impl Iterator<Item = usize> + '_ {
        self.joints
            .iter()
            .enumerate()
            .filter(|(_, joint)| joint.parent.is_none())
            .map(|(index, _)| index)
    }

    /// Set the world transform of joint `index`
    pub fn set_joint_transform(&mut self, index: usize, transform: Mat4) -> Result<()> {
        let count = self.joints.len();
        let joint = self.joints.get_mut(index).ok_or_else(|| {
            Error::InvalidResource(format!("joint {} out of range ({} joints)", index, count))
        })?;
        joint.transform = transform;
        Ok(())
    }

    /// Skinning matrices, at most `MAX_JOINTS` of them
    pub fn joint_matrices(&self) -> Vec<Mat4> {
        if self.joints.len() > MAX_JOINTS {
            crate::engine_warn!(
                "lumen3d::Skeleton",
                "{} joints exceed the skinning capacity of {}; extra joints are ignored",
                self.joints.len(),
                MAX_JOINTS
            );
        }
        self.joints
            .iter()
            .take(MAX_JOINTS)
            .map(|joint| joint.transform * joint.offset)
            .collect()
    }
}

#[cfg(test)]
#[path = "skeleton_tests.rs"]
mod tests;
