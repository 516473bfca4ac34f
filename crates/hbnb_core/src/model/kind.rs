//! Record kinds and their typed field sets.
//!
//! # Responsibility
//! - Define the closed set of record kinds the store accepts.
//! - Map discriminator strings to kinds through one lookup table.
//! - Give every kind an explicit field table instead of free-form
//!   attributes.
//!
//! # Invariants
//! - `RecordKind::parse(kind.as_str()) == Some(kind)` for every kind.
//! - Kind fields are plain strings; `None` means "never set" and is not
//!   persisted. Reads of unset fields yield the empty string.

use std::fmt::{Display, Formatter};

/// Closed set of record kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RecordKind {
    BaseModel,
    User,
    Place,
    State,
    City,
    Amenity,
    Review,
}

const KIND_TABLE: &[(&str, RecordKind)] = &[
    ("BaseModel", RecordKind::BaseModel),
    ("User", RecordKind::User),
    ("Place", RecordKind::Place),
    ("State", RecordKind::State),
    ("City", RecordKind::City),
    ("Amenity", RecordKind::Amenity),
    ("Review", RecordKind::Review),
];

impl RecordKind {
    /// Discriminator string used in composite keys and `__class__`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BaseModel => "BaseModel",
            Self::User => "User",
            Self::Place => "Place",
            Self::State => "State",
            Self::City => "City",
            Self::Amenity => "Amenity",
            Self::Review => "Review",
        }
    }

    /// Looks up a kind by its exact discriminator string.
    pub fn parse(name: &str) -> Option<Self> {
        KIND_TABLE
            .iter()
            .find(|(candidate, _)| *candidate == name)
            .map(|(_, kind)| *kind)
    }

    /// All kinds, in whitelist order.
    pub fn all() -> impl Iterator<Item = RecordKind> {
        KIND_TABLE.iter().map(|(_, kind)| *kind)
    }

    /// Kind-specific field names, in persisted order.
    pub fn fields(self) -> &'static [&'static str] {
        match self {
            Self::BaseModel => &[],
            Self::User => User::FIELDS,
            Self::Place => Place::FIELDS,
            Self::State => State::FIELDS,
            Self::City => City::FIELDS,
            Self::Amenity => Amenity::FIELDS,
            Self::Review => Review::FIELDS,
        }
    }
}

impl Display for RecordKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed field table for one record kind.
pub trait FieldSet {
    const FIELDS: &'static [&'static str];

    fn slot(&self, name: &str) -> Option<&Option<String>>;
    fn slot_mut(&mut self, name: &str) -> Option<&mut Option<String>>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct User {
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl FieldSet for User {
    const FIELDS: &'static [&'static str] = &["email", "password", "first_name", "last_name"];

    fn slot(&self, name: &str) -> Option<&Option<String>> {
        match name {
            "email" => Some(&self.email),
            "password" => Some(&self.password),
            "first_name" => Some(&self.first_name),
            "last_name" => Some(&self.last_name),
            _ => None,
        }
    }

    fn slot_mut(&mut self, name: &str) -> Option<&mut Option<String>> {
        match name {
            "email" => Some(&mut self.email),
            "password" => Some(&mut self.password),
            "first_name" => Some(&mut self.first_name),
            "last_name" => Some(&mut self.last_name),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Place {
    pub city_id: Option<String>,
    pub user_id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub number_rooms: Option<String>,
    pub number_bathrooms: Option<String>,
    pub max_guest: Option<String>,
    pub price_by_night: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    /// Comma separated amenity ids.
    pub amenity_ids: Option<String>,
}

impl FieldSet for Place {
    const FIELDS: &'static [&'static str] = &[
        "city_id",
        "user_id",
        "name",
        "description",
        "number_rooms",
        "number_bathrooms",
        "max_guest",
        "price_by_night",
        "latitude",
        "longitude",
        "amenity_ids",
    ];

    fn slot(&self, name: &str) -> Option<&Option<String>> {
        match name {
            "city_id" => Some(&self.city_id),
            "user_id" => Some(&self.user_id),
            "name" => Some(&self.name),
            "description" => Some(&self.description),
            "number_rooms" => Some(&self.number_rooms),
            "number_bathrooms" => Some(&self.number_bathrooms),
            "max_guest" => Some(&self.max_guest),
            "price_by_night" => Some(&self.price_by_night),
            "latitude" => Some(&self.latitude),
            "longitude" => Some(&self.longitude),
            "amenity_ids" => Some(&self.amenity_ids),
            _ => None,
        }
    }

    fn slot_mut(&mut self, name: &str) -> Option<&mut Option<String>> {
        match name {
            "city_id" => Some(&mut self.city_id),
            "user_id" => Some(&mut self.user_id),
            "name" => Some(&mut self.name),
            "description" => Some(&mut self.description),
            "number_rooms" => Some(&mut self.number_rooms),
            "number_bathrooms" => Some(&mut self.number_bathrooms),
            "max_guest" => Some(&mut self.max_guest),
            "price_by_night" => Some(&mut self.price_by_night),
            "latitude" => Some(&mut self.latitude),
            "longitude" => Some(&mut self.longitude),
            "amenity_ids" => Some(&mut self.amenity_ids),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct State {
    pub name: Option<String>,
}

impl FieldSet for State {
    const FIELDS: &'static [&'static str] = &["name"];

    fn slot(&self, name: &str) -> Option<&Option<String>> {
        match name {
            "name" => Some(&self.name),
            _ => None,
        }
    }

    fn slot_mut(&mut self, name: &str) -> Option<&mut Option<String>> {
        match name {
            "name" => Some(&mut self.name),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct City {
    pub state_id: Option<String>,
    pub name: Option<String>,
}

impl FieldSet for City {
    const FIELDS: &'static [&'static str] = &["state_id", "name"];

    fn slot(&self, name: &str) -> Option<&Option<String>> {
        match name {
            "state_id" => Some(&self.state_id),
            "name" => Some(&self.name),
            _ => None,
        }
    }

    fn slot_mut(&mut self, name: &str) -> Option<&mut Option<String>> {
        match name {
            "state_id" => Some(&mut self.state_id),
            "name" => Some(&mut self.name),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Amenity {
    pub name: Option<String>,
}

impl FieldSet for Amenity {
    const FIELDS: &'static [&'static str] = &["name"];

    fn slot(&self, name: &str) -> Option<&Option<String>> {
        match name {
            "name" => Some(&self.name),
            _ => None,
        }
    }

    fn slot_mut(&mut self, name: &str) -> Option<&mut Option<String>> {
        match name {
            "name" => Some(&mut self.name),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Review {
    pub place_id: Option<String>,
    pub user_id: Option<String>,
    pub text: Option<String>,
}

impl FieldSet for Review {
    const FIELDS: &'static [&'static str] = &["place_id", "user_id", "text"];

    fn slot(&self, name: &str) -> Option<&Option<String>> {
        match name {
            "place_id" => Some(&self.place_id),
            "user_id" => Some(&self.user_id),
            "text" => Some(&self.text),
            _ => None,
        }
    }

    fn slot_mut(&mut self, name: &str) -> Option<&mut Option<String>> {
        match name {
            "place_id" => Some(&mut self.place_id),
            "user_id" => Some(&mut self.user_id),
            "text" => Some(&mut self.text),
            _ => None,
        }
    }
}

/// Kind-specific payload of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordBody {
    BaseModel,
    User(User),
    Place(Place),
    State(State),
    City(City),
    Amenity(Amenity),
    Review(Review),
}

impl RecordBody {
    /// Builds a body with every field unset.
    pub fn empty(kind: RecordKind) -> Self {
        match kind {
            RecordKind::BaseModel => Self::BaseModel,
            RecordKind::User => Self::User(User::default()),
            RecordKind::Place => Self::Place(Place::default()),
            RecordKind::State => Self::State(State::default()),
            RecordKind::City => Self::City(City::default()),
            RecordKind::Amenity => Self::Amenity(Amenity::default()),
            RecordKind::Review => Self::Review(Review::default()),
        }
    }

    pub fn kind(&self) -> RecordKind {
        match self {
            Self::BaseModel => RecordKind::BaseModel,
            Self::User(_) => RecordKind::User,
            Self::Place(_) => RecordKind::Place,
            Self::State(_) => RecordKind::State,
            Self::City(_) => RecordKind::City,
            Self::Amenity(_) => RecordKind::Amenity,
            Self::Review(_) => RecordKind::Review,
        }
    }

    pub(crate) fn slot(&self, name: &str) -> Option<&Option<String>> {
        match self {
            Self::BaseModel => None,
            Self::User(body) => body.slot(name),
            Self::Place(body) => body.slot(name),
            Self::State(body) => body.slot(name),
            Self::City(body) => body.slot(name),
            Self::Amenity(body) => body.slot(name),
            Self::Review(body) => body.slot(name),
        }
    }

    pub(crate) fn slot_mut(&mut self, name: &str) -> Option<&mut Option<String>> {
        match self {
            Self::BaseModel => None,
            Self::User(body) => body.slot_mut(name),
            Self::Place(body) => body.slot_mut(name),
            Self::State(body) => body.slot_mut(name),
            Self::City(body) => body.slot_mut(name),
            Self::Amenity(body) => body.slot_mut(name),
            Self::Review(body) => body.slot_mut(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{RecordBody, RecordKind};

    #[test]
    fn parse_round_trips_every_kind() {
        for kind in RecordKind::all() {
            assert_eq!(RecordKind::parse(kind.as_str()), Some(kind));
            assert_eq!(RecordBody::empty(kind).kind(), kind);
        }
        assert_eq!(RecordKind::all().count(), 7);
    }

    #[test]
    fn parse_is_exact_and_case_sensitive() {
        assert_eq!(RecordKind::parse("user"), None);
        assert_eq!(RecordKind::parse(" User"), None);
        assert_eq!(RecordKind::parse("MyModel"), None);
    }

    #[test]
    fn every_declared_field_has_a_slot() {
        for kind in RecordKind::all() {
            let mut body = RecordBody::empty(kind);
            for field in kind.fields() {
                assert!(body.slot(field).is_some(), "{kind}.{field} has no slot");
                assert!(body.slot_mut(field).is_some(), "{kind}.{field} has no slot");
            }
            assert!(body.slot("not_a_field").is_none());
        }
    }

    #[test]
    fn base_model_has_no_kind_fields() {
        assert!(RecordKind::BaseModel.fields().is_empty());
        assert!(RecordBody::BaseModel.slot("name").is_none());
    }
}
