use super::music_manager::MusicError;
use super::track::{Requester, Track};
use rand::seq::SliceRandom;
use std::collections::VecDeque;

/// Result type for queue operations
pub type QueueResult<T> = Result<T, MusicError>;

/// Capacity and per-track limits applied at enqueue time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueLimits {
    pub max_queue_size: usize,
    pub max_track_duration_ms: u64,
}

impl Default for QueueLimits {
    fn default() -> Self {
        Self {
            max_queue_size: 50,
            max_track_duration_ms: 1_800_000,
        }
    }
}

impl QueueLimits {
    /// Reject tracks at or over the duration limit.
    pub fn check_duration(&self, track: &Track) -> QueueResult<()> {
        if track.duration_ms >= self.max_track_duration_ms {
            return Err(MusicError::TrackTooLong {
                duration_ms: track.duration_ms,
                max_ms: self.max_track_duration_ms,
            });
        }
        Ok(())
    }
}

/// The pending tracks of one guild, in play order.
#[derive(Debug, Default)]
pub struct TrackQueue {
    tracks: VecDeque<Track>,
    limits: QueueLimits,
}

impl TrackQueue {
    pub fn new(limits: QueueLimits) -> Self {
        Self {
            tracks: VecDeque::new(),
            limits,
        }
    }

    pub fn limits(&self) -> QueueLimits {
        self.limits
    }

    /// Append a track for `requester`. Returns its 1-based position.
    pub fn enqueue(&mut self, mut track: Track, requester: Requester) -> QueueResult<usize> {
        if self.tracks.len() >= self.limits.max_queue_size {
            return Err(MusicError::QueueFull {
                max: self.limits.max_queue_size,
            });
        }
        self.limits.check_duration(&track)?;

        track.attach_requester(requester);
        self.tracks.push_back(track);
        Ok(self.tracks.len())
    }

    /// Remove and return the head of the queue.
    pub fn dequeue_front(&mut self) -> QueueResult<Track> {
        self.tracks.pop_front().ok_or(MusicError::EmptyQueue)
    }

    /// Append `recycled` and take the head in one step, so the length never
    /// exceeds the capacity even when the queue is full.
    pub(crate) fn cycle(&mut self, recycled: Track) -> Track {
        match self.tracks.pop_front() {
            Some(head) => {
                self.tracks.push_back(recycled);
                head
            }
            None => recycled,
        }
    }

    /// Put an already-tagged entry at the tail without validation.
    #[cfg(test)]
    pub(crate) fn push_back_entry(&mut self, track: Track) {
        self.tracks.push_back(track);
    }

    /// Empty the queue. Returns how many tracks were dropped.
    pub fn clear(&mut self) -> usize {
        let removed = self.tracks.len();
        self.tracks.clear();
        removed
    }

    /// Reorder the pending tracks uniformly at random.
    pub fn shuffle(&mut self) {
        self.tracks.make_contiguous().shuffle(&mut rand::rng());
    }

    /// Up to `n` tracks from the head, in order.
    pub fn peek_n(&self, n: usize) -> Vec<Track> {
        self.tracks.iter().take(n).cloned().collect()
    }

    pub fn front(&self) -> Option<&Track> {
        self.tracks.front()
    }

    /// Remove the track at a 1-based position.
    pub fn remove(&mut self, position: usize) -> Option<Track> {
        if position == 0 {
            return None;
        }
        self.tracks.remove(position - 1)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn total_duration_ms(&self) -> u64 {
        self.tracks.iter().map(|t| t.duration_ms).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;
    use rstest::*;
    use serenity::model::id::UserId;

    fn track(title: &str, duration_ms: u64) -> Track {
        Track::new(title, "Artist", format!("https://example.com/{}", title), duration_ms)
    }

    fn titles(queue: &TrackQueue) -> Vec<String> {
        queue.peek_n(queue.len()).into_iter().map(|t| t.title).collect()
    }

    #[fixture]
    fn requester() -> Requester {
        Requester::new(UserId::new(7), "listener")
    }

    #[fixture]
    fn queue() -> TrackQueue {
        TrackQueue::new(QueueLimits::default())
    }

    #[rstest]
    fn test_enqueue_appends_and_tags_requester(mut queue: TrackQueue, requester: Requester) {
        assert_eq!(queue.enqueue(track("A", 1_000), requester.clone()).unwrap(), 1);
        assert_eq!(queue.enqueue(track("B", 1_000), requester.clone()).unwrap(), 2);

        assert_eq!(titles(&queue), vec!["A", "B"]);
        assert_eq!(queue.front().unwrap().requester, Some(requester));
    }

    #[rstest]
    fn test_enqueue_rejects_when_full(requester: Requester) {
        let mut queue = TrackQueue::new(QueueLimits {
            max_queue_size: 2,
            ..Default::default()
        });
        queue.enqueue(track("A", 1_000), requester.clone()).unwrap();
        queue.enqueue(track("B", 1_000), requester.clone()).unwrap();

        let result = queue.enqueue(track("C", 1_000), requester);

        assert_matches!(result, Err(MusicError::QueueFull { max: 2 }));
        assert_eq!(titles(&queue), vec!["A", "B"]);
    }

    #[rstest]
    #[case(1_800_000)]
    #[case(1_800_001)]
    #[case(7_200_000)]
    fn test_enqueue_rejects_long_tracks(
        mut queue: TrackQueue,
        requester: Requester,
        #[case] duration_ms: u64,
    ) {
        let result = queue.enqueue(track("Long", duration_ms), requester);
        assert_matches!(result, Err(MusicError::TrackTooLong { .. }));
        assert!(queue.is_empty());
    }

    #[rstest]
    fn test_enqueue_accepts_just_under_limit(mut queue: TrackQueue, requester: Requester) {
        assert!(queue.enqueue(track("Ok", 1_799_999), requester).is_ok());
    }

    #[rstest]
    fn test_dequeue_front_is_fifo(mut queue: TrackQueue, requester: Requester) {
        queue.enqueue(track("A", 1_000), requester.clone()).unwrap();
        queue.enqueue(track("B", 1_000), requester).unwrap();

        assert_eq!(queue.dequeue_front().unwrap().title, "A");
        assert_eq!(queue.dequeue_front().unwrap().title, "B");
        assert_matches!(queue.dequeue_front(), Err(MusicError::EmptyQueue));
    }

    #[rstest]
    fn test_clear_reports_removed(mut queue: TrackQueue, requester: Requester) {
        queue.enqueue(track("A", 1_000), requester.clone()).unwrap();
        queue.enqueue(track("B", 1_000), requester).unwrap();

        assert_eq!(queue.clear(), 2);
        assert!(queue.is_empty());
        assert_eq!(queue.clear(), 0);
    }

    #[rstest]
    fn test_shuffle_keeps_contents(mut queue: TrackQueue, requester: Requester) {
        for i in 0..20 {
            queue.enqueue(track(&format!("T{}", i), 1_000), requester.clone()).unwrap();
        }
        let mut before = titles(&queue);
        queue.shuffle();
        let mut after = titles(&queue);

        assert_eq!(after.len(), 20);
        before.sort();
        after.sort();
        assert_eq!(before, after);
    }

    #[rstest]
    fn test_peek_n_preserves_order(mut queue: TrackQueue, requester: Requester) {
        for name in ["A", "B", "C"] {
            queue.enqueue(track(name, 1_000), requester.clone()).unwrap();
        }
        let peeked: Vec<String> = queue.peek_n(2).into_iter().map(|t| t.title).collect();
        assert_eq!(peeked, vec!["A", "B"]);
        assert_eq!(queue.peek_n(10).len(), 3);
        assert_eq!(queue.len(), 3);
    }

    #[rstest]
    fn test_cycle_on_full_queue_stays_bounded(requester: Requester) {
        let mut queue = TrackQueue::new(QueueLimits {
            max_queue_size: 2,
            ..Default::default()
        });
        queue.enqueue(track("A", 1_000), requester.clone()).unwrap();
        queue.enqueue(track("B", 1_000), requester).unwrap();

        let head = queue.cycle(track("C", 1_000));

        assert_eq!(head.title, "A");
        assert_eq!(titles(&queue), vec!["B", "C"]);
    }

    #[rstest]
    fn test_cycle_on_empty_queue_returns_recycled(mut queue: TrackQueue) {
        let head = queue.cycle(track("C", 1_000));
        assert_eq!(head.title, "C");
        assert!(queue.is_empty());
    }

    #[rstest]
    fn test_remove_by_position(mut queue: TrackQueue, requester: Requester) {
        for name in ["A", "B", "C"] {
            queue.enqueue(track(name, 1_000), requester.clone()).unwrap();
        }
        assert_eq!(queue.remove(2).unwrap().title, "B");
        assert!(queue.remove(0).is_none());
        assert!(queue.remove(5).is_none());
        assert_eq!(titles(&queue), vec!["A", "C"]);
    }

    #[rstest]
    fn test_total_duration(mut queue: TrackQueue, requester: Requester) {
        queue.enqueue(track("A", 1_000), requester.clone()).unwrap();
        queue.enqueue(track("B", 2_500), requester).unwrap();
        assert_eq!(queue.total_duration_ms(), 3_500);
    }
}
