pub mod block;
mod ids;
pub mod reading;
pub mod session;

pub use block::{BlockSummary, SampleBlock, Units};
pub use reading::{
    NewReading, PersonRef, RawSamples, ReadingEnvelope, ReadingsEnvelope, SaveAck, StoredReading,
};
pub use session::{
    ActivePatient, ActivePatientsEnvelope, ActiveSessionInfo, AssignedDevice, AssignedDoctor,
    SessionStatus, SessionStatusUpdate,
};
