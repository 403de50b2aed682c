//! Print job dispatch

mod router;

pub use router::DispatchRouter;
