use crate::frame::Frame;
use crate::store::Tx;
use crate::Error;

/// A command executing against one open transaction. Standalone commands run
/// inside their own transaction; EXEC threads a single one through every
/// queued command.
pub trait Executable {
    fn exec(self, tx: &Tx) -> Result<Frame, Error>;
}
