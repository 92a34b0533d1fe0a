use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type ReservationId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomType {
    Single,
    Double,
    Family,
}

impl RoomType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomType::Single => "single",
            RoomType::Double => "double",
            RoomType::Family => "family",
        }
    }

    /// Accepts the English names and the Spanish names the original front
    /// desk forms used.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "single" | "individual" => Some(RoomType::Single),
            "double" | "doble" => Some(RoomType::Double),
            "family" | "familiar" => Some(RoomType::Family),
            _ => None,
        }
    }
}

impl fmt::Display for RoomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Room inventory for one room type: how many smoking and non-smoking
/// rooms remain free, how many guests each room holds, and whether pets
/// are accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomClass {
    pub smoking_free: u32,
    pub non_smoking_free: u32,
    pub capacity: u32,
    pub allows_pets: bool,
}

/// One confirmed reservation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    pub id: ReservationId,
    pub room_type: RoomType,
    pub smoking: bool,
    pub guest_name: String,
    pub country: String,
    pub party_size: u32,
    /// Free-form stay description, e.g. "2024-05-20 to 2024-05-25".
    pub period: String,
    pub has_pet: bool,
    pub created_at: DateTime<Utc>,
}

/// What a guest asks for at the front desk.
#[derive(Debug, Clone)]
pub struct ReservationRequest {
    pub room_type: RoomType,
    pub smoking: bool,
    pub guest_name: String,
    pub country: String,
    pub party_size: u32,
    pub period: String,
    pub has_pet: bool,
}

/// Aggregate view over all confirmed reservations.
#[derive(Debug, Clone, Serialize)]
pub struct HotelStatistics {
    pub total_reservations: usize,
    pub total_guests: u32,
    pub with_pets: usize,
    pub reservations: Vec<ReservationSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReservationSummary {
    pub guest_name: String,
    pub country: String,
    pub party_size: u32,
    pub period: String,
    pub has_pet: bool,
}

/// The hotel reservation tracker. Entirely independent of the teller
/// ledger; it shares no state with it.
#[derive(Debug, Clone)]
pub struct Hotel {
    rooms: BTreeMap<RoomType, RoomClass>,
    reservations: Vec<Reservation>,
}

impl Default for Hotel {
    fn default() -> Self {
        Self::new()
    }
}

impl Hotel {
    /// Standard inventory: three smoking and three non-smoking rooms of
    /// each type; only family rooms accept pets.
    pub fn new() -> Self {
        let mut rooms = BTreeMap::new();
        rooms.insert(
            RoomType::Single,
            RoomClass {
                smoking_free: 3,
                non_smoking_free: 3,
                capacity: 2,
                allows_pets: false,
            },
        );
        rooms.insert(
            RoomType::Double,
            RoomClass {
                smoking_free: 3,
                non_smoking_free: 3,
                capacity: 4,
                allows_pets: false,
            },
        );
        rooms.insert(
            RoomType::Family,
            RoomClass {
                smoking_free: 3,
                non_smoking_free: 3,
                capacity: 6,
                allows_pets: true,
            },
        );
        Self {
            rooms,
            reservations: Vec::new(),
        }
    }

    /// Try to book a room. Checks run in order: vacancy for the smoking
    /// preference, then capacity, then the pet policy; inventory is only
    /// decremented once all checks pass.
    pub fn reserve(&mut self, request: ReservationRequest) -> Result<&Reservation, ReservationError> {
        let class = self
            .rooms
            .get_mut(&request.room_type)
            .expect("all room types have inventory");

        let free = if request.smoking {
            class.smoking_free
        } else {
            class.non_smoking_free
        };
        if free == 0 {
            return Err(ReservationError::NoVacancy {
                room_type: request.room_type,
                smoking: request.smoking,
            });
        }

        if request.party_size > class.capacity {
            return Err(ReservationError::CapacityExceeded {
                room_type: request.room_type,
                capacity: class.capacity,
                requested: request.party_size,
            });
        }

        if request.has_pet && !class.allows_pets {
            return Err(ReservationError::PetsNotAllowed(request.room_type));
        }

        if request.smoking {
            class.smoking_free -= 1;
        } else {
            class.non_smoking_free -= 1;
        }

        self.reservations.push(Reservation {
            id: Uuid::new_v4(),
            room_type: request.room_type,
            smoking: request.smoking,
            guest_name: request.guest_name,
            country: request.country,
            party_size: request.party_size,
            period: request.period,
            has_pet: request.has_pet,
            created_at: Utc::now(),
        });
        Ok(self.reservations.last().expect("just pushed"))
    }

    pub fn reservations(&self) -> &[Reservation] {
        &self.reservations
    }

    pub fn statistics(&self) -> HotelStatistics {
        HotelStatistics {
            total_reservations: self.reservations.len(),
            total_guests: self.reservations.iter().map(|r| r.party_size).sum(),
            with_pets: self.reservations.iter().filter(|r| r.has_pet).count(),
            reservations: self
                .reservations
                .iter()
                .map(|r| ReservationSummary {
                    guest_name: r.guest_name.clone(),
                    country: r.country.clone(),
                    party_size: r.party_size,
                    period: r.period.clone(),
                    has_pet: r.has_pet,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReservationError {
    NoVacancy { room_type: RoomType, smoking: bool },
    CapacityExceeded {
        room_type: RoomType,
        capacity: u32,
        requested: u32,
    },
    PetsNotAllowed(RoomType),
}

impl fmt::Display for ReservationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReservationError::NoVacancy { room_type, smoking } => {
                let kind = if *smoking { "smoking" } else { "non-smoking" };
                write!(f, "No {} {} rooms available", kind, room_type)
            }
            ReservationError::CapacityExceeded {
                room_type,
                capacity,
                requested,
            } => write!(
                f,
                "A {} room holds at most {} guests, {} requested",
                room_type, capacity, requested
            ),
            ReservationError::PetsNotAllowed(room_type) => {
                write!(f, "Pets are only accepted in family rooms, not {}", room_type)
            }
        }
    }
}

impl std::error::Error for ReservationError {}
