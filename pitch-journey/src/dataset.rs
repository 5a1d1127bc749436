use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::error::{DatasetError, JourneyError};

const BUNDLED_DATASET: &str = include_str!("../assets/dataset.json");

/// Geographic coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// A single labelled figure shown in panels and prompts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stat {
    pub label: String,
    pub value: String,
}

/// Kinds of records held by the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Resource,
    Company,
    Property,
    FutureZone,
    SciencePark,
    InfrastructureRoad,
    EvidenceGroup,
    EvidenceItem,
}

impl EntityKind {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Resource => "resource",
            Self::Company => "company",
            Self::Property => "property",
            Self::FutureZone => "future zone",
            Self::SciencePark => "science park",
            Self::InfrastructureRoad => "infrastructure road",
            Self::EvidenceGroup => "evidence group",
            Self::EvidenceItem => "evidence item",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Records addressable by identifier.
pub trait Entity {
    const KIND: EntityKind;

    fn id(&self) -> &str;
}

/// The development site every journey is centred on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub name: String,
    pub tagline: String,
    pub center: GeoPoint,
    pub boundary_radius_km: f64,
}

/// Natural or utility resource surveyed in the first journey.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: String,
    pub name: String,
    pub summary: String,
    pub location: GeoPoint,
    #[serde(default)]
    pub stats: Vec<Stat>,
    #[serde(default)]
    pub evidence_group: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: String,
    pub name: String,
    pub sector: String,
    pub summary: String,
    pub location: GeoPoint,
    #[serde(default)]
    pub stats: Vec<Stat>,
}

/// Investment opportunity presented in the final journey.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: String,
    pub name: String,
    pub summary: String,
    pub asking_price: String,
    pub location: GeoPoint,
    #[serde(default)]
    pub stats: Vec<Stat>,
    /// Route line from the property to the site's key anchors.
    #[serde(default)]
    pub route: Vec<GeoPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FutureZone {
    pub id: String,
    pub name: String,
    pub summary: String,
    pub outline: Vec<GeoPoint>,
    #[serde(default)]
    pub stats: Vec<Stat>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SciencePark {
    pub id: String,
    pub name: String,
    pub summary: String,
    pub location: GeoPoint,
    #[serde(default)]
    pub stats: Vec<Stat>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfrastructureRoad {
    pub id: String,
    pub name: String,
    pub summary: String,
    pub path: Vec<GeoPoint>,
    #[serde(default)]
    pub stats: Vec<Stat>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceItem {
    pub id: String,
    pub title: String,
    pub detail: String,
    #[serde(default)]
    pub location: Option<GeoPoint>,
}

/// Named collection of supporting documents, disclosed independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceGroup {
    pub id: String,
    pub title: String,
    pub items: Vec<EvidenceItem>,
}

impl EvidenceGroup {
    #[must_use]
    pub fn item(&self, id: &str) -> Option<&EvidenceItem> {
        self.items.iter().find(|item| item.id == id)
    }
}

/// Canned answer for the free-form follow-up once the tour is complete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowUpTopic {
    pub id: String,
    pub keywords: Vec<String>,
    pub answer: String,
}

impl FollowUpTopic {
    /// True when any keyword occurs in the question, ignoring case.
    #[must_use]
    pub fn matches(&self, question: &str) -> bool {
        let question = question.to_lowercase();
        self.keywords
            .iter()
            .any(|keyword| question.contains(&keyword.to_lowercase()))
    }
}

macro_rules! impl_entity {
    ($($ty:ty => $kind:expr),* $(,)?) => {
        $(
            impl Entity for $ty {
                const KIND: EntityKind = $kind;

                fn id(&self) -> &str {
                    &self.id
                }
            }
        )*
    };
}

impl_entity! {
    Resource => EntityKind::Resource,
    Company => EntityKind::Company,
    Property => EntityKind::Property,
    FutureZone => EntityKind::FutureZone,
    SciencePark => EntityKind::SciencePark,
    InfrastructureRoad => EntityKind::InfrastructureRoad,
    EvidenceGroup => EntityKind::EvidenceGroup,
}

/// Read-only content backing every prompt, panel and map layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub site: Site,
    #[serde(default)]
    pub resources: Vec<Resource>,
    #[serde(default)]
    pub companies: Vec<Company>,
    #[serde(default)]
    pub properties: Vec<Property>,
    #[serde(default)]
    pub future_zones: Vec<FutureZone>,
    #[serde(default)]
    pub science_parks: Vec<SciencePark>,
    #[serde(default)]
    pub roads: Vec<InfrastructureRoad>,
    #[serde(default)]
    pub evidence: Vec<EvidenceGroup>,
    #[serde(default)]
    pub follow_ups: Vec<FollowUpTopic>,
}

impl Dataset {
    /// Load a dataset from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into a dataset.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// The pitch content compiled into the crate.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded document fails to parse.
    pub fn bundled() -> Result<Self, serde_json::Error> {
        Self::from_json(BUNDLED_DATASET)
    }

    /// Check identifier uniqueness and cross references.
    ///
    /// # Errors
    ///
    /// Returns the first inconsistency found.
    pub fn validate(&self) -> Result<(), DatasetError> {
        ensure_unique(&self.resources)?;
        ensure_unique(&self.companies)?;
        ensure_unique(&self.properties)?;
        ensure_unique(&self.future_zones)?;
        ensure_unique(&self.science_parks)?;
        ensure_unique(&self.roads)?;
        ensure_unique(&self.evidence)?;

        for group in &self.evidence {
            if group.items.is_empty() {
                return Err(DatasetError::EmptyEvidenceGroup {
                    group: group.id.clone(),
                });
            }
            let mut seen = HashSet::new();
            for item in &group.items {
                if !seen.insert(item.id.as_str()) {
                    return Err(DatasetError::DuplicateId {
                        kind: EntityKind::EvidenceItem,
                        id: format!("{}/{}", group.id, item.id),
                    });
                }
            }
        }

        for resource in &self.resources {
            if let Some(group) = &resource.evidence_group
                && self.evidence_group(group).is_err()
            {
                return Err(DatasetError::DanglingEvidence {
                    owner: format!("resource '{}'", resource.id),
                    group: group.clone(),
                });
            }
        }
        Ok(())
    }

    /// Look up a resource.
    ///
    /// # Errors
    ///
    /// Returns [`JourneyError::UnknownEntity`] when the id is not present.
    pub fn resource(&self, id: &str) -> Result<&Resource, JourneyError> {
        find(&self.resources, id)
    }

    /// Look up a company.
    ///
    /// # Errors
    ///
    /// Returns [`JourneyError::UnknownEntity`] when the id is not present.
    pub fn company(&self, id: &str) -> Result<&Company, JourneyError> {
        find(&self.companies, id)
    }

    /// Look up a property.
    ///
    /// # Errors
    ///
    /// Returns [`JourneyError::UnknownEntity`] when the id is not present.
    pub fn property(&self, id: &str) -> Result<&Property, JourneyError> {
        find(&self.properties, id)
    }

    /// Look up a future zone.
    ///
    /// # Errors
    ///
    /// Returns [`JourneyError::UnknownEntity`] when the id is not present.
    pub fn future_zone(&self, id: &str) -> Result<&FutureZone, JourneyError> {
        find(&self.future_zones, id)
    }

    /// Look up a science park.
    ///
    /// # Errors
    ///
    /// Returns [`JourneyError::UnknownEntity`] when the id is not present.
    pub fn science_park(&self, id: &str) -> Result<&SciencePark, JourneyError> {
        find(&self.science_parks, id)
    }

    /// Look up an infrastructure road.
    ///
    /// # Errors
    ///
    /// Returns [`JourneyError::UnknownEntity`] when the id is not present.
    pub fn road(&self, id: &str) -> Result<&InfrastructureRoad, JourneyError> {
        find(&self.roads, id)
    }

    /// Look up an evidence group.
    ///
    /// # Errors
    ///
    /// Returns [`JourneyError::UnknownEntity`] when the id is not present.
    pub fn evidence_group(&self, id: &str) -> Result<&EvidenceGroup, JourneyError> {
        find(&self.evidence, id)
    }

    /// First follow-up topic whose keywords occur in the question.
    #[must_use]
    pub fn follow_up_for(&self, question: &str) -> Option<&FollowUpTopic> {
        self.follow_ups.iter().find(|topic| topic.matches(question))
    }
}

fn find<'a, T: Entity>(items: &'a [T], id: &str) -> Result<&'a T, JourneyError> {
    items
        .iter()
        .find(|item| item.id() == id)
        .ok_or_else(|| JourneyError::unknown(T::KIND, id))
}

fn ensure_unique<T: Entity>(items: &[T]) -> Result<(), DatasetError> {
    let mut seen = HashSet::new();
    for item in items {
        if !seen.insert(item.id()) {
            return Err(DatasetError::DuplicateId {
                kind: T::KIND,
                id: item.id().to_string(),
            });
        }
    }
    Ok(())
}
