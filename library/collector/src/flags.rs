bitflags::bitflags! {
    /// Work the collector has decided is pending.
    ///
    /// All three flags are only read or written with the collector lock held.
    pub struct CollectorFlags: u8 {
        /// The next rendezvous must wait for every alive worker
        const NEED_RENDEZVOUS = 1;
        /// The rendezvous handler should run the cycle detector
        const NEED_ROOT_SCAN = 1 << 1;
        /// A snapshot exists and may be applied by a collection pass
        const NEED_COLLECTION = 1 << 2;
    }
}
impl Default for CollectorFlags {
    fn default() -> Self {
        Self::empty()
    }
}
