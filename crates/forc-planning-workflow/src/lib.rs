//! Planning Workflow (C4, spec §4.4): the durable per-order saga that
//! determines a process path, scores and reserves a station, validates
//! labor, reserves equipment and units, and assigns a wave — compensating
//! in reverse order on any terminal failure, escalating tier on
//! constraint.

pub mod clock;
pub mod compensation;
pub mod events;
pub mod workflow;

pub use clock::{ChronoClock, FixedClock, WorkflowClock};
pub use compensation::{run_compensations, CompensatingAction};
pub use events::{WorkflowEvent, WorkflowVersion};
pub use workflow::{PlanningWorkflow, StepOutcome, WorkflowContext, WorkflowError, WorkflowState};
