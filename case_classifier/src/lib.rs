//! Classification of twisty-puzzle algorithms: the case model, the reverse
//! engineer that reads a case off a simulated puzzle state, the case
//! pattern DSL and the hierarchy of named training case sets.

pub mod case;
pub mod case_sets;
pub mod pattern;
pub mod reverse_engineer;

pub use case::{Case, CaseError};
pub use case_sets::{
    AbstractCaseSet, BufferedParitySet, BufferedParityTwistSet, BufferedThreeCycleSet,
    BufferedThreeTwistSet, CASE_SETS, ConcreteCaseSet, ConcreteFloatingTwoTwistSet,
    FloatingTwoTwistSet, ParitySet, ParityTwistSet, PatternArityError, ThreeCycleSet,
    ThreeTwistSet,
};
pub use pattern::{CasePattern, LeafCasePattern, PartCyclePattern, PartPattern, TwistPattern};
pub use reverse_engineer::CaseReverseEngineer;
