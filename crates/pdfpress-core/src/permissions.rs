//! Document permissions that can be restricted when locking a PDF

use crate::error::PdfPressError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// Text extraction for screen readers
    Accessibility,
    /// Copying or extracting content
    Extract,
    /// Adding or changing annotations
    ModifyAnnotation,
    /// Inserting, rotating or reordering pages
    ModifyAssembly,
    /// Filling in form fields
    ModifyForm,
    /// Any other modification
    ModifyOther,
    /// Low resolution printing
    PrintLowres,
    /// High resolution printing
    PrintHighres,
}

impl Permission {
    pub const ALL: [Permission; 8] = [
        Permission::Accessibility,
        Permission::Extract,
        Permission::ModifyAnnotation,
        Permission::ModifyAssembly,
        Permission::ModifyForm,
        Permission::ModifyOther,
        Permission::PrintLowres,
        Permission::PrintHighres,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Permission::Accessibility => "accessibility",
            Permission::Extract => "extract",
            Permission::ModifyAnnotation => "modify_annotation",
            Permission::ModifyAssembly => "modify_assembly",
            Permission::ModifyForm => "modify_form",
            Permission::ModifyOther => "modify_other",
            Permission::PrintLowres => "print_lowres",
            Permission::PrintHighres => "print_highres",
        }
    }

    /// Human readable description used in listings
    pub fn description(&self) -> &'static str {
        match self {
            Permission::Accessibility => "accessibility (screen readers)",
            Permission::Extract => "content extraction (copy/extract)",
            Permission::ModifyAnnotation => "annotation changes",
            Permission::ModifyAssembly => "document assembly (reorder/pages)",
            Permission::ModifyForm => "form filling",
            Permission::ModifyOther => "other modifications",
            Permission::PrintLowres => "low resolution printing",
            Permission::PrintHighres => "high resolution printing",
        }
    }

    fn lopdf_flag(&self) -> lopdf::Permissions {
        match self {
            Permission::Accessibility => lopdf::Permissions::COPYABLE_FOR_ACCESSIBILITY,
            Permission::Extract => lopdf::Permissions::COPYABLE,
            Permission::ModifyAnnotation => lopdf::Permissions::ANNOTABLE,
            Permission::ModifyAssembly => lopdf::Permissions::ASSEMBLABLE,
            Permission::ModifyForm => lopdf::Permissions::FILLABLE,
            Permission::ModifyOther => lopdf::Permissions::MODIFIABLE,
            Permission::PrintLowres => lopdf::Permissions::PRINTABLE,
            Permission::PrintHighres => lopdf::Permissions::PRINTABLE_IN_HIGH_QUALITY,
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Permission {
    type Err = PdfPressError;

    /// Accepts snake_case or kebab-case names, case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        Permission::ALL
            .iter()
            .copied()
            .find(|p| p.name() == normalized)
            .ok_or_else(|| {
                let names: Vec<&str> = Permission::ALL.iter().map(|p| p.name()).collect();
                PdfPressError::InvalidPermission(format!(
                    "unknown name '{}', expected one of: {}",
                    s.trim(),
                    names.join(", ")
                ))
            })
    }
}

/// The set of permissions to block. Everything is blocked by default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSet {
    blocked: BTreeSet<Permission>,
}

impl Default for PermissionSet {
    fn default() -> Self {
        Self::block_all()
    }
}

impl PermissionSet {
    pub fn block_all() -> Self {
        Self {
            blocked: Permission::ALL.iter().copied().collect(),
        }
    }

    pub fn allow_all() -> Self {
        Self {
            blocked: BTreeSet::new(),
        }
    }

    pub fn allow(&mut self, permission: Permission) -> &mut Self {
        self.blocked.remove(&permission);
        self
    }

    pub fn block(&mut self, permission: Permission) -> &mut Self {
        self.blocked.insert(permission);
        self
    }

    pub fn is_blocked(&self, permission: Permission) -> bool {
        self.blocked.contains(&permission)
    }

    pub fn blocked(&self) -> impl Iterator<Item = Permission> + '_ {
        self.blocked.iter().copied()
    }

    pub fn allowed(&self) -> impl Iterator<Item = Permission> + '_ {
        Permission::ALL
            .iter()
            .copied()
            .filter(move |p| !self.is_blocked(*p))
    }

    /// Start from "block everything" and allow the named permissions
    pub fn allowing<I, S>(names: I) -> Result<Self, PdfPressError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::block_all();
        for name in names {
            set.allow(name.as_ref().parse()?);
        }
        Ok(set)
    }

    /// Permission bits granted to the user of the locked document
    pub fn to_lopdf(&self) -> lopdf::Permissions {
        self.allowed()
            .fold(lopdf::Permissions::empty(), |acc, p| acc | p.lopdf_flag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_blocks_everything() {
        let set = PermissionSet::default();
        for p in Permission::ALL {
            assert!(set.is_blocked(p), "{} should be blocked", p);
        }
        assert!(set.to_lopdf().is_empty());
    }

    #[test]
    fn test_allow_all_grants_all_bits() {
        let set = PermissionSet::allow_all();
        let bits = set.to_lopdf();
        assert!(bits.contains(lopdf::Permissions::PRINTABLE));
        assert!(bits.contains(lopdf::Permissions::PRINTABLE_IN_HIGH_QUALITY));
        assert!(bits.contains(lopdf::Permissions::COPYABLE));
        assert!(bits.contains(lopdf::Permissions::COPYABLE_FOR_ACCESSIBILITY));
        assert!(bits.contains(lopdf::Permissions::ANNOTABLE));
        assert!(bits.contains(lopdf::Permissions::ASSEMBLABLE));
        assert!(bits.contains(lopdf::Permissions::FILLABLE));
        assert!(bits.contains(lopdf::Permissions::MODIFIABLE));
    }

    #[test]
    fn test_allowing_named_permissions() {
        let set = PermissionSet::allowing(["print-lowres", "ACCESSIBILITY"]).unwrap();
        assert!(!set.is_blocked(Permission::PrintLowres));
        assert!(!set.is_blocked(Permission::Accessibility));
        assert!(set.is_blocked(Permission::Extract));

        let bits = set.to_lopdf();
        assert_eq!(
            bits.bits(),
            (lopdf::Permissions::PRINTABLE | lopdf::Permissions::COPYABLE_FOR_ACCESSIBILITY).bits()
        );
    }

    #[test]
    fn test_unknown_permission_is_rejected() {
        let err = "teleport".parse::<Permission>().unwrap_err();
        assert!(matches!(err, PdfPressError::InvalidPermission(_)));
        assert!(err.to_string().starts_with("Invalid permission"));
        assert!(err.to_string().contains("teleport"));
        assert!(err.to_string().contains("print_highres"));
    }

    #[test]
    fn test_block_after_allow() {
        let mut set = PermissionSet::allow_all();
        set.block(Permission::Extract).block(Permission::ModifyOther);
        let blocked: Vec<_> = set.blocked().collect();
        assert_eq!(blocked, vec![Permission::Extract, Permission::ModifyOther]);
    }

    #[test]
    fn test_names_round_trip_through_parse() {
        for p in Permission::ALL {
            assert_eq!(p.name().parse::<Permission>().unwrap(), p);
        }
    }
}
