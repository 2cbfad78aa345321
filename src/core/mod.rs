pub mod gate;
pub mod labels;
pub mod reconciler;
pub mod reference;
pub mod resolver;
pub mod wizard;

pub use gate::{Rule, ValidationGate};
pub use labels::{LabelLookup, StaticLabels};
pub use reconciler::{CollectionReconciler, CollectionSpec};
pub use reference::{ReferenceSource, SequentialReferenceSource};
pub use resolver::{FieldDependencyResolver, LookupTable, RefreshOutcome};
pub use wizard::{LoadOutcome, StepDef, WizardController};
