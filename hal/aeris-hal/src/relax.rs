//! Busy-wait strategies
//!
//! Every blocking call in Aeris is a poll loop. The loop body is delegated
//! to a [`Relax`] implementation so a simulator or a host port can make
//! progress (or sleep) between polls without touching protocol logic.

/// One iteration of a busy-wait
pub trait Relax {
    /// Called once per failed poll
    fn relax(&mut self);
}

/// Plain spin loop, used on bare hardware
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Spin;

impl Relax for Spin {
    #[inline(always)]
    fn relax(&mut self) {
        core::hint::spin_loop();
    }
}

impl<T: Relax + ?Sized> Relax for &mut T {
    fn relax(&mut self) {
        (**self).relax();
    }
}
