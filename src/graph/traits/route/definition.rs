use codec::SegmentId;

pub trait Route {
    /// Cheapest sequence of segments leading from `start` into `finish`,
    /// both included, along successor links.
    ///
    /// The cost of a route is the total length of every segment entered
    /// after `start`. Returns `None` if `finish` cannot be reached.
    fn route(&self, start: SegmentId, finish: SegmentId) -> Option<(f64, Vec<SegmentId>)>;

    /// Whether `finish` can be reached from `start` along successor links.
    fn reaches(&self, start: SegmentId, finish: SegmentId) -> bool {
        self.route(start, finish).is_some()
    }
}
