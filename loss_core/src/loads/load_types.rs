//! Product load types
//!
//! Every section force increment in the time-step analysis is booked against
//! one of these product load types, so the history can be broken down into
//! dead loads, prestress and time-dependent effects.

use serde::{Deserialize, Serialize};

/// Product load types tracked by the time-step analysis.
///
/// # Example
/// ```
/// use loss_core::loads::ProductForce;
///
/// assert_eq!(ProductForce::Creep.code(), "CR");
/// assert!(ProductForce::Creep.is_time_dependent());
/// assert!(!ProductForce::Deck.is_time_dependent());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProductForce {
    /// Self-weight of the precast girder
    GirderSelfWeight,
    /// Intermediate and end diaphragms
    Diaphragm,
    /// Cast-in-place deck and haunch
    Deck,
    /// Traffic barriers
    TrafficBarrier,
    /// Sidewalks
    Sidewalk,
    /// Wearing surface overlay
    Overlay,
    /// User-defined DC loads
    UserDc,
    /// User-defined DW loads
    UserDw,
    /// Transfer of pretension force at release
    Pretension,
    /// Post-tensioning (primary from the tendon, secondary from the solver)
    PostTensioning,
    /// Creep of concrete
    Creep,
    /// Shrinkage of concrete
    Shrinkage,
    /// Relaxation of prestressing steel
    Relaxation,
}

impl ProductForce {
    /// Number of product load types
    pub const COUNT: usize = 13;

    /// All product load types in ledger order
    pub const ALL: [ProductForce; ProductForce::COUNT] = [
        ProductForce::GirderSelfWeight,
        ProductForce::Diaphragm,
        ProductForce::Deck,
        ProductForce::TrafficBarrier,
        ProductForce::Sidewalk,
        ProductForce::Overlay,
        ProductForce::UserDc,
        ProductForce::UserDw,
        ProductForce::Pretension,
        ProductForce::PostTensioning,
        ProductForce::Creep,
        ProductForce::Shrinkage,
        ProductForce::Relaxation,
    ];

    /// Position of this load type in a ledger
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Short code used in reports
    pub fn code(&self) -> &'static str {
        match self {
            ProductForce::GirderSelfWeight => "GIRDER",
            ProductForce::Diaphragm => "DIAPH",
            ProductForce::Deck => "SLAB",
            ProductForce::TrafficBarrier => "BARRIER",
            ProductForce::Sidewalk => "SIDEWALK",
            ProductForce::Overlay => "OVERLAY",
            ProductForce::UserDc => "USER_DC",
            ProductForce::UserDw => "USER_DW",
            ProductForce::Pretension => "PS",
            ProductForce::PostTensioning => "PT",
            ProductForce::Creep => "CR",
            ProductForce::Shrinkage => "SH",
            ProductForce::Relaxation => "RE",
        }
    }

    /// Human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            ProductForce::GirderSelfWeight => "Girder self-weight",
            ProductForce::Diaphragm => "Diaphragms",
            ProductForce::Deck => "Deck",
            ProductForce::TrafficBarrier => "Traffic barrier",
            ProductForce::Sidewalk => "Sidewalk",
            ProductForce::Overlay => "Overlay",
            ProductForce::UserDc => "User defined DC",
            ProductForce::UserDw => "User defined DW",
            ProductForce::Pretension => "Pretensioning",
            ProductForce::PostTensioning => "Post-tensioning",
            ProductForce::Creep => "Creep",
            ProductForce::Shrinkage => "Shrinkage",
            ProductForce::Relaxation => "Relaxation",
        }
    }

    /// Creep, shrinkage and relaxation
    pub fn is_time_dependent(&self) -> bool {
        self.mechanism().is_some()
    }

    /// Loads whose response comes from the structural solver
    pub fn is_solver_load(&self) -> bool {
        !matches!(
            self,
            ProductForce::Pretension
                | ProductForce::Creep
                | ProductForce::Shrinkage
                | ProductForce::Relaxation
        )
    }

    /// Time-dependent mechanism represented by this load type
    pub fn mechanism(&self) -> Option<Mechanism> {
        match self {
            ProductForce::Creep => Some(Mechanism::Creep),
            ProductForce::Shrinkage => Some(Mechanism::Shrinkage),
            ProductForce::Relaxation => Some(Mechanism::Relaxation),
            _ => None,
        }
    }
}

impl std::fmt::Display for ProductForce {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Time-dependent mechanisms that generate restraining forces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mechanism {
    Creep,
    Shrinkage,
    Relaxation,
}

impl Mechanism {
    pub const ALL: [Mechanism; 3] = [Mechanism::Creep, Mechanism::Shrinkage, Mechanism::Relaxation];

    pub fn index(&self) -> usize {
        match self {
            Mechanism::Creep => 0,
            Mechanism::Shrinkage => 1,
            Mechanism::Relaxation => 2,
        }
    }

    pub fn product_force(&self) -> ProductForce {
        match self {
            Mechanism::Creep => ProductForce::Creep,
            Mechanism::Shrinkage => ProductForce::Shrinkage,
            Mechanism::Relaxation => ProductForce::Relaxation,
        }
    }

    /// Name of the structural solver load case holding the imposed deformations
    pub fn load_case_name(&self) -> &'static str {
        match self {
            Mechanism::Creep => "Creep",
            Mechanism::Shrinkage => "Shrinkage",
            Mechanism::Relaxation => "Relaxation",
        }
    }
}
