//! Catalog entry model.
//!
//! A [`CatalogEntry`] is one named quantity in the catalog, discriminated by
//! `kind`: plain and derived scalars, plain and derived vectors, and
//! unit-less metadata entries. All kinds share an [`EntryHeader`]; vector
//! kinds add a coordinate [`Frame`] and a per-axis component map, derived
//! kinds add a [`Provenance`] record describing how the quantity is obtained.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::EntryError;
use crate::provenance::Provenance;
use crate::token;
use crate::unit::Unit;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Lifecycle state of an entry.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Proposed, not yet ratified. The initial state.
    #[default]
    Draft,
    /// Ratified and in use.
    Active,
    /// Still resolvable, but `superseded_by` names the replacement.
    Deprecated,
    /// Retired; kept only so old references stay explainable.
    Superseded,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Draft => "draft",
            Status::Active => "active",
            Status::Deprecated => "deprecated",
            Status::Superseded => "superseded",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Frame
// ---------------------------------------------------------------------------

/// Coordinate frame a vector's components are expressed in.
///
/// Serialized in snake case, so `Frame::CylindricalRTorZ` round-trips as
/// `"cylindrical_r_tor_z"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frame {
    CylindricalRTorZ,
    CartesianXYZ,
    SphericalRThetaPhi,
    FluxSurface,
}

impl Frame {
    pub fn as_str(self) -> &'static str {
        match self {
            Frame::CylindricalRTorZ => "cylindrical_r_tor_z",
            Frame::CartesianXYZ => "cartesian_x_y_z",
            Frame::SphericalRThetaPhi => "spherical_r_theta_phi",
            Frame::FluxSurface => "flux_surface",
        }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// EntryHeader
// ---------------------------------------------------------------------------

/// Fields common to every entry kind.
///
/// Empty optional fields are omitted from the serialized form, so stored
/// documents stay minimal and diff-friendly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryHeader {
    /// Canonical name, also the catalog key.
    pub name: String,
    /// One-sentence human description.
    pub description: String,
    /// Longer free-form documentation.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub documentation: String,
    /// Physical unit; the dimensionless unit is omitted when serialized.
    #[serde(default, skip_serializing_if = "Unit::is_dimensionless")]
    pub unit: Unit,
    #[serde(default)]
    pub status: Status,
    /// Where the quantity is meaningful, e.g. `core plasma only`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub validity_domain: String,
    /// Free-form physical constraints, e.g. `non-negative`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<String>,
    /// Name this entry replaces, if it was introduced as a rename.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecates: Option<String>,
    /// Replacement name; required once `status` is `deprecated`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub superseded_by: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// External references (papers, data dictionaries).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<String>,
}

impl EntryHeader {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        EntryHeader {
            name: name.into(),
            description: description.into(),
            ..Default::default()
        }
    }
}

// ---------------------------------------------------------------------------
// CatalogEntry
// ---------------------------------------------------------------------------

/// One named entry in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CatalogEntry {
    /// Directly measured or prescribed scalar quantity.
    Scalar {
        #[serde(flatten)]
        header: EntryHeader,
    },
    /// Scalar computed from other entries.
    DerivedScalar {
        #[serde(flatten)]
        header: EntryHeader,
        provenance: Provenance,
    },
    /// Vector quantity decomposed into per-axis component entries.
    Vector {
        #[serde(flatten)]
        header: EntryHeader,
        frame: Frame,
        /// Axis token to component entry name, e.g.
        /// `radial` to `radial_component_of_magnetic_field`.
        components: BTreeMap<String, String>,
        /// Optional magnitude entry, always `magnitude_of_<name>`.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        magnitude: Option<String>,
    },
    /// Vector computed from other entries.
    DerivedVector {
        #[serde(flatten)]
        header: EntryHeader,
        frame: Frame,
        components: BTreeMap<String, String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        magnitude: Option<String>,
        provenance: Provenance,
    },
    /// Non-physical bookkeeping entry; carries no unit semantics.
    Metadata {
        #[serde(flatten)]
        header: EntryHeader,
    },
}

impl CatalogEntry {
    pub fn scalar(
        name: impl Into<String>,
        description: impl Into<String>,
        unit: Unit,
    ) -> Self {
        let mut header = EntryHeader::new(name, description);
        header.unit = unit;
        CatalogEntry::Scalar { header }
    }

    pub fn derived_scalar(
        name: impl Into<String>,
        description: impl Into<String>,
        unit: Unit,
        provenance: Provenance,
    ) -> Self {
        let mut header = EntryHeader::new(name, description);
        header.unit = unit;
        CatalogEntry::DerivedScalar { header, provenance }
    }

    pub fn vector<I, A, C>(
        name: impl Into<String>,
        description: impl Into<String>,
        unit: Unit,
        frame: Frame,
        components: I,
    ) -> Self
    where
        I: IntoIterator<Item = (A, C)>,
        A: Into<String>,
        C: Into<String>,
    {
        let mut header = EntryHeader::new(name, description);
        header.unit = unit;
        CatalogEntry::Vector {
            header,
            frame,
            components: components
                .into_iter()
                .map(|(axis, component)| (axis.into(), component.into()))
                .collect(),
            magnitude: None,
        }
    }

    pub fn derived_vector<I, A, C>(
        name: impl Into<String>,
        description: impl Into<String>,
        unit: Unit,
        frame: Frame,
        components: I,
        provenance: Provenance,
    ) -> Self
    where
        I: IntoIterator<Item = (A, C)>,
        A: Into<String>,
        C: Into<String>,
    {
        let mut header = EntryHeader::new(name, description);
        header.unit = unit;
        CatalogEntry::DerivedVector {
            header,
            frame,
            components: components
                .into_iter()
                .map(|(axis, component)| (axis.into(), component.into()))
                .collect(),
            magnitude: None,
            provenance,
        }
    }

    pub fn metadata(
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        CatalogEntry::Metadata {
            header: EntryHeader::new(name, description),
        }
    }

    /// Sets the lifecycle status, chainable.
    pub fn with_status(mut self, status: Status) -> Self {
        self.header_mut().status = status;
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.header_mut().tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_superseded_by(mut self, successor: impl Into<String>) -> Self {
        self.header_mut().superseded_by = Some(successor.into());
        self
    }

    pub fn with_deprecates(mut self, predecessor: impl Into<String>) -> Self {
        self.header_mut().deprecates = Some(predecessor.into());
        self
    }

    /// Declares the magnitude entry on a vector kind; scalar and metadata
    /// kinds are left unchanged.
    pub fn with_magnitude(mut self, magnitude_entry: impl Into<String>) -> Self {
        if let CatalogEntry::Vector { magnitude, .. }
        | CatalogEntry::DerivedVector { magnitude, .. } = &mut self
        {
            *magnitude = Some(magnitude_entry.into());
        }
        self
    }

    // -- accessors ----------------------------------------------------------

    pub fn name(&self) -> &str {
        &self.header().name
    }

    pub fn header(&self) -> &EntryHeader {
        match self {
            CatalogEntry::Scalar { header }
            | CatalogEntry::DerivedScalar { header, .. }
            | CatalogEntry::Vector { header, .. }
            | CatalogEntry::DerivedVector { header, .. }
            | CatalogEntry::Metadata { header } => header,
        }
    }

    pub fn header_mut(&mut self) -> &mut EntryHeader {
        match self {
            CatalogEntry::Scalar { header }
            | CatalogEntry::DerivedScalar { header, .. }
            | CatalogEntry::Vector { header, .. }
            | CatalogEntry::DerivedVector { header, .. }
            | CatalogEntry::Metadata { header } => header,
        }
    }

    /// The serialized kind discriminant, e.g. `derived_vector`.
    pub fn kind(&self) -> &'static str {
        match self {
            CatalogEntry::Scalar { .. } => "scalar",
            CatalogEntry::DerivedScalar { .. } => "derived_scalar",
            CatalogEntry::Vector { .. } => "vector",
            CatalogEntry::DerivedVector { .. } => "derived_vector",
            CatalogEntry::Metadata { .. } => "metadata",
        }
    }

    pub fn is_vector(&self) -> bool {
        matches!(
            self,
            CatalogEntry::Vector { .. } | CatalogEntry::DerivedVector { .. }
        )
    }

    pub fn is_derived(&self) -> bool {
        matches!(
            self,
            CatalogEntry::DerivedScalar { .. }
                | CatalogEntry::DerivedVector { .. }
        )
    }

    pub fn frame(&self) -> Option<Frame> {
        match self {
            CatalogEntry::Vector { frame, .. }
            | CatalogEntry::DerivedVector { frame, .. } => Some(*frame),
            _ => None,
        }
    }

    pub fn components(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            CatalogEntry::Vector { components, .. }
            | CatalogEntry::DerivedVector { components, .. } => Some(components),
            _ => None,
        }
    }

    pub fn magnitude(&self) -> Option<&str> {
        match self {
            CatalogEntry::Vector { magnitude, .. }
            | CatalogEntry::DerivedVector { magnitude, .. } => {
                magnitude.as_deref()
            }
            _ => None,
        }
    }

    pub fn provenance(&self) -> Option<&Provenance> {
        match self {
            CatalogEntry::DerivedScalar { provenance, .. }
            | CatalogEntry::DerivedVector { provenance, .. } => Some(provenance),
            _ => None,
        }
    }

    /// The only name a magnitude entry of this vector may carry.
    pub fn magnitude_name(&self) -> String {
        format!("magnitude_of_{}", self.name())
    }

    // -- validation ---------------------------------------------------------

    /// Checks the entry in isolation: name shape, lifecycle consistency,
    /// vector component layout, and provenance completeness. Cross-entry
    /// checks (dangling references, cycles) live in catalog validation.
    pub fn validate(&self) -> Result<(), EntryError> {
        let header = self.header();
        if !token::is_canonical(&header.name) {
            return Err(EntryError::InvalidName {
                name: header.name.clone(),
            });
        }
        if header.status == Status::Deprecated
            && !header
                .superseded_by
                .as_deref()
                .is_some_and(|successor| !successor.is_empty())
        {
            return Err(EntryError::MissingSupersededBy {
                name: header.name.clone(),
            });
        }
        if let Some(components) = self.components() {
            if components.len() < 2 {
                return Err(EntryError::TooFewComponents {
                    name: header.name.clone(),
                    count: components.len(),
                });
            }
            for (axis, component) in components {
                if !token::is_canonical(axis) {
                    return Err(EntryError::InvalidAxis {
                        name: header.name.clone(),
                        axis: axis.clone(),
                    });
                }
                let prefix = format!("{axis}_component_of_");
                if !component.starts_with(&prefix) {
                    return Err(EntryError::ComponentPrefix {
                        axis: axis.clone(),
                        component: component.clone(),
                    });
                }
            }
            if let Some(declared) = self.magnitude() {
                let expected = self.magnitude_name();
                if declared != expected {
                    return Err(EntryError::BadMagnitude {
                        name: header.name.clone(),
                        declared: declared.to_string(),
                        expected,
                    });
                }
            }
        }
        if let Some(provenance) = self.provenance() {
            provenance.validate(&header.name)?;
        }
        Ok(())
    }
}
