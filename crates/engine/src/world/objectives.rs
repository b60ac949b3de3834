use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info};

use super::{Destination, DestinationRegistry, Vec2};

pub const DEFAULT_OBJECTIVE_COUNT: usize = 5;

/// What the player learned when reaching an objective.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitReport {
    pub name: String,
    pub info_text: String,
}

impl VisitReport {
    pub fn message(&self) -> String {
        format!("{}: {}", self.name, self.info_text)
    }
}

/// An ordered run through a random subset of the destination pool.
///
/// The session owns every loaded destination so rendering can show the whole
/// campus, while `selected` holds indices into `pool` in visiting order. At
/// most one pool entry has `is_active_target` set at a time.
#[derive(Debug, Clone)]
pub struct ObjectiveSession {
    pool: Vec<Destination>,
    selected: Vec<usize>,
    // `None` before the first advance; `Some(selected.len())` once finished.
    cursor: Option<usize>,
}

impl ObjectiveSession {
    /// Picks `min(pool.len(), objective_count)` distinct destinations in random
    /// order, resets their state, and activates the first one.
    pub fn start<R: Rng + ?Sized>(
        registry: DestinationRegistry,
        objective_count: usize,
        rng: &mut R,
    ) -> Self {
        let mut pool = registry.into_destinations();
        let mut order: Vec<usize> = (0..pool.len()).collect();
        order.shuffle(rng);
        order.truncate(objective_count.min(pool.len()));

        for destination in &mut pool {
            destination.is_active_target = false;
        }
        for &index in &order {
            pool[index].visited = false;
        }

        let mut session = Self {
            pool,
            selected: order,
            cursor: None,
        };
        info!(
            pool = session.pool.len(),
            selected = session.selected.len(),
            requested = objective_count,
            "objective_session_started"
        );
        session.advance();
        session
    }

    pub fn destinations(&self) -> &[Destination] {
        &self.pool
    }

    pub fn selected(&self) -> impl Iterator<Item = &Destination> + '_ {
        self.selected.iter().map(|&index| &self.pool[index])
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    pub fn visited_count(&self) -> usize {
        self.selected().filter(|destination| destination.visited).count()
    }

    pub fn current_target(&self) -> Option<&Destination> {
        self.current_pool_index().map(|index| &self.pool[index])
    }

    /// 1-based position of the current target within the selection.
    pub fn current_number(&self) -> Option<usize> {
        let cursor = self.cursor?;
        (cursor < self.selected.len()).then_some(cursor + 1)
    }

    fn current_pool_index(&self) -> Option<usize> {
        self.cursor
            .and_then(|cursor| self.selected.get(cursor).copied())
    }

    /// Moves to the next unvisited selection. Returns `false` once the
    /// selection is exhausted, leaving no active target.
    pub fn advance(&mut self) -> bool {
        if let Some(index) = self.current_pool_index() {
            self.pool[index].set_active_target(false);
        }

        let was_finished = self.is_finished();
        loop {
            let next = self
                .cursor
                .map_or(0, |cursor| cursor + 1)
                .min(self.selected.len());
            self.cursor = Some(next);

            let Some(&index) = self.selected.get(next) else {
                if !was_finished {
                    info!(
                        visited = self.visited_count(),
                        total = self.selected.len(),
                        "objective_session_complete"
                    );
                }
                return false;
            };

            let destination = &mut self.pool[index];
            if destination.visited {
                debug!(
                    name = destination.name.as_str(),
                    "objective_already_visited_skipping"
                );
                continue;
            }
            destination.set_active_target(true);
            info!(
                name = destination.name.as_str(),
                number = next + 1,
                total = self.selected.len(),
                "objective_selected"
            );
            return true;
        }
    }

    /// Marks the current target visited when the player's circle overlaps it,
    /// then advances.
    pub fn on_proximity(&mut self, player: Vec2, player_radius: f32) -> Option<VisitReport> {
        let index = self.current_pool_index()?;
        let target = &mut self.pool[index];
        if target.visited || player.distance(target.position) >= target.radius + player_radius {
            return None;
        }

        target.mark_visited();
        let report = VisitReport {
            name: target.name.clone(),
            info_text: target.info_text.clone(),
        };
        info!(name = report.name.as_str(), "objective_reached");
        self.advance();
        Some(report)
    }

    /// Gives up on the current target. It counts as visited so the session
    /// can still complete.
    pub fn skip_current(&mut self) -> bool {
        let Some(index) = self.current_pool_index() else {
            return false;
        };
        self.pool[index].mark_visited();
        info!(
            name = self.pool[index].name.as_str(),
            "objective_skipped"
        );
        self.advance()
    }

    /// True when every selected destination is visited. An empty selection
    /// counts as done.
    pub fn all_visited(&self) -> bool {
        self.selected().all(|destination| destination.visited)
    }

    fn is_finished(&self) -> bool {
        self.cursor
            .is_some_and(|cursor| cursor >= self.selected.len())
    }

    pub fn status_text(&self) -> String {
        if let (Some(target), Some(number)) = (self.current_target(), self.current_number()) {
            return format!("Find ({}/{}): {}", number, self.selected.len(), target.name);
        }
        if self.selected.is_empty() {
            return "No objectives available for this session.".to_string();
        }
        if self.all_visited() {
            return "Session Complete! All objectives met!".to_string();
        }
        format!(
            "Objectives: {}/{} visited",
            self.visited_count(),
            self.selected.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn registry(count: usize) -> DestinationRegistry {
        DestinationRegistry::from_destinations(
            (0..count)
                .map(|i| {
                    Destination::new(
                        format!("d{i}"),
                        format!("Place {i}"),
                        Vec2::new(100.0 * i as f32, 50.0),
                        30.0,
                        format!("About place {i}"),
                    )
                })
                .collect(),
        )
    }

    fn active_count(session: &ObjectiveSession) -> usize {
        session
            .destinations()
            .iter()
            .filter(|destination| destination.is_active_target)
            .count()
    }

    #[test]
    fn start_selects_distinct_subset_and_activates_first() {
        let mut rng = StdRng::seed_from_u64(7);
        let session = ObjectiveSession::start(registry(8), 5, &mut rng);

        assert_eq!(session.selected_count(), 5);
        let ids: HashSet<_> = session.selected().map(|d| d.id.clone()).collect();
        assert_eq!(ids.len(), 5);
        assert_eq!(active_count(&session), 1);
        assert!(session.current_target().expect("target").is_active_target);
        assert_eq!(session.current_number(), Some(1));
    }

    #[test]
    fn selection_is_capped_by_pool_size() {
        let mut rng = StdRng::seed_from_u64(1);
        let session = ObjectiveSession::start(registry(3), 5, &mut rng);
        assert_eq!(session.selected_count(), 3);
    }

    #[test]
    fn same_seed_gives_same_order() {
        let order = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            ObjectiveSession::start(registry(10), 5, &mut rng)
                .selected()
                .map(|d| d.id.clone())
                .collect::<Vec<_>>()
        };
        assert_eq!(order(42), order(42));
    }

    #[test]
    fn empty_pool_reports_no_objectives() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut session = ObjectiveSession::start(DestinationRegistry::default(), 5, &mut rng);

        assert!(session.current_target().is_none());
        assert!(!session.advance());
        assert!(session.all_visited());
        assert_eq!(
            session.status_text(),
            "No objectives available for this session."
        );
    }

    #[test]
    fn visiting_every_target_completes_session() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut session = ObjectiveSession::start(registry(6), 4, &mut rng);
        let mut names = Vec::new();

        while let Some(target) = session.current_target() {
            assert_eq!(active_count(&session), 1);
            let position = target.position;
            let report = session
                .on_proximity(position, 10.0)
                .expect("standing on target reaches it");
            names.push(report.name);
        }

        assert_eq!(names.len(), 4);
        assert_eq!(active_count(&session), 0);
        assert!(session.all_visited());
        assert_eq!(
            session.status_text(),
            "Session Complete! All objectives met!"
        );
        assert!(!session.advance());
    }

    #[test]
    fn five_of_eight_destinations_complete_after_five_visits() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut session = ObjectiveSession::start(registry(8), 5, &mut rng);

        assert_eq!(session.destinations().len(), 8);
        assert_eq!(session.selected_count(), 5);
        assert!(session.selected().all(|destination| !destination.visited));
        assert_eq!(session.visited_count(), 0);
        assert!(!session.all_visited());

        for visit in 1..=5 {
            assert_eq!(session.current_number(), Some(visit));
            let position = session.current_target().expect("target remains").position;
            assert!(session.on_proximity(position, 10.0).is_some());
            assert_eq!(session.visited_count(), visit);
        }

        assert!(session.all_visited());
        assert!(session.current_target().is_none());
        assert_eq!(active_count(&session), 0);
        let untouched = session
            .destinations()
            .iter()
            .filter(|destination| !destination.visited)
            .count();
        assert_eq!(untouched, 3);
    }

    #[test]
    fn proximity_uses_strict_radius_sum() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut session = ObjectiveSession::start(registry(1), 1, &mut rng);
        let target = session.current_target().expect("target").position;

        // distance == radius sum: not yet
        let edge = Vec2::new(target.x + 40.0, target.y);
        assert!(session.on_proximity(edge, 10.0).is_none());

        let inside = Vec2::new(target.x + 39.9, target.y);
        let report = session.on_proximity(inside, 10.0).expect("reached");
        assert_eq!(report.message(), "Place 0: About place 0");
        assert!(session.current_target().is_none());
    }

    #[test]
    fn proximity_ignores_non_target_destinations() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut session = ObjectiveSession::start(registry(3), 3, &mut rng);
        let current = session.current_target().expect("target").id.clone();
        let other = session
            .selected()
            .find(|d| d.id != current)
            .expect("other")
            .position;

        assert!(session.on_proximity(other, 10.0).is_none());
        assert_eq!(session.visited_count(), 0);
    }

    #[test]
    fn skip_marks_visited_and_moves_on() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut session = ObjectiveSession::start(registry(2), 2, &mut rng);
        let first = session.current_target().expect("first").id.clone();

        assert!(session.skip_current());
        assert_ne!(session.current_target().expect("second").id, first);
        let expected = format!(
            "Find (2/2): {}",
            session.current_target().expect("second").name
        );
        assert_eq!(session.status_text(), expected);

        assert!(!session.skip_current());
        assert!(session.all_visited());
        assert!(!session.skip_current());
    }
}
