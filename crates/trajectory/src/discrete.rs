//! Forkable discrete trajectories.
//!
//! A trajectory family is an arena of nodes: the root plus any number of
//! forks, each sharing its parent's prefix up to (and including) the fork
//! point and owning its own suffix. Samples are strictly time-ordered;
//! violating that, or orphaning a fork, is a programmer error and panics.

use serde::{Deserialize, Serialize};

use nbody_geometry::{DegreesOfFreedom, Frame};
use nbody_quantities::Instant;

/// Handle to one node of a trajectory family. Invalidated by
/// [`DiscreteTrajectory::delete_fork`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForkId(usize);

impl ForkId {
    /// The root node of every family.
    pub const ROOT: ForkId = ForkId(0);
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
struct Node<F: Frame> {
    samples: Vec<(Instant, DegreesOfFreedom<F>)>,
    /// Parent node and fork-point instant; `None` for the root.
    parent: Option<(ForkId, Instant)>,
    children: Vec<ForkId>,
}

impl<F: Frame> Node<F> {
    fn new(parent: Option<(ForkId, Instant)>) -> Self {
        Self {
            samples: Vec::new(),
            parent,
            children: Vec::new(),
        }
    }
}

/// A family of strictly time-ordered `(Instant, DegreesOfFreedom)`
/// sequences sharing prefixes through forks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct DiscreteTrajectory<F: Frame> {
    nodes: Vec<Option<Node<F>>>,
}

impl<F: Frame> DiscreteTrajectory<F> {
    pub fn new() -> Self {
        Self {
            nodes: vec![Some(Node::new(None))],
        }
    }

    fn node(&self, id: ForkId) -> &Node<F> {
        self.nodes
            .get(id.0)
            .and_then(|slot| slot.as_ref())
            .expect("use of a deleted fork")
    }

    fn node_mut(&mut self, id: ForkId) -> &mut Node<F> {
        self.nodes
            .get_mut(id.0)
            .and_then(|slot| slot.as_mut())
            .expect("use of a deleted fork")
    }

    /// The chain of ancestors from the root down to `id`, with the
    /// effective ceiling each ancestor's samples are observed through.
    fn chain(&self, id: ForkId) -> Vec<(ForkId, Option<Instant>)> {
        let mut chain = Vec::new();
        let mut current = id;
        let mut ceiling: Option<Instant> = None;
        loop {
            chain.push((current, ceiling));
            match self.node(current).parent {
                Some((parent, fork_time)) => {
                    ceiling = Some(match ceiling {
                        Some(c) => c.min(fork_time),
                        None => fork_time,
                    });
                    current = parent;
                }
                None => break,
            }
        }
        chain.reverse();
        chain
    }

    /// Iterates the logical concatenation of the ancestors' prefixes and
    /// the node's own samples, in time order.
    pub fn iter(&self, id: ForkId) -> impl Iterator<Item = &(Instant, DegreesOfFreedom<F>)> {
        self.chain(id).into_iter().flat_map(move |(node, ceiling)| {
            let samples = &self.node(node).samples;
            let end = match ceiling {
                Some(c) => samples.partition_point(|(t, _)| *t <= c),
                None => samples.len(),
            };
            samples[..end].iter()
        })
    }

    /// Appends a sample; `t` must be strictly greater than the last time.
    pub fn append(&mut self, id: ForkId, t: Instant, dof: DegreesOfFreedom<F>) {
        if let Some((last, _)) = self.back(id) {
            assert!(
                t > last,
                "non-monotonic append: {t} does not follow {last}"
            );
        }
        self.node_mut(id).samples.push((t, dof));
    }

    /// The last sample of the logical view of `id`.
    pub fn back(&self, id: ForkId) -> Option<(Instant, DegreesOfFreedom<F>)> {
        let node = self.node(id);
        if let Some(&last) = node.samples.last() {
            return Some(last);
        }
        match node.parent {
            Some((parent, fork_time)) => {
                let dof = self
                    .find(parent, fork_time)
                    .expect("fork point must exist in the parent");
                Some((fork_time, dof))
            }
            None => None,
        }
    }

    /// The first sample of the logical view of `id`.
    pub fn front(&self, id: ForkId) -> Option<(Instant, DegreesOfFreedom<F>)> {
        self.iter(id).next().copied()
    }

    /// The sample exactly at `t`, if any.
    pub fn find(&self, id: ForkId, t: Instant) -> Option<DegreesOfFreedom<F>> {
        for (node, ceiling) in self.chain(id) {
            if ceiling.is_some_and(|c| t > c) {
                continue;
            }
            let samples = &self.node(node).samples;
            if let Ok(index) = samples.binary_search_by(|(s, _)| s.cmp(&t)) {
                return Some(samples[index].1);
            }
        }
        None
    }

    /// Number of samples in the logical view of `id`.
    pub fn size(&self, id: ForkId) -> usize {
        self.iter(id).count()
    }

    pub fn is_empty(&self, id: ForkId) -> bool {
        self.iter(id).next().is_none()
    }

    /// Creates a fork rooted at the last sample of `id`.
    pub fn new_fork_at_last(&mut self, id: ForkId) -> ForkId {
        let (fork_time, _) = self
            .back(id)
            .expect("cannot fork an empty trajectory");
        self.insert_child(id, fork_time)
    }

    /// Creates a fork rooted at the existing sample at `t`; the fork
    /// starts empty past its fork point.
    pub fn new_fork_at(&mut self, id: ForkId, t: Instant) -> ForkId {
        assert!(
            self.find(id, t).is_some(),
            "fork point {t} is not a sample of the trajectory"
        );
        self.insert_child(id, t)
    }

    /// Creates a fork rooted at the existing sample at `t`, copying the
    /// samples after `t` into the fork.
    pub fn new_fork_with_copy(&mut self, id: ForkId, t: Instant) -> ForkId {
        assert!(
            self.find(id, t).is_some(),
            "fork point {t} is not a sample of the trajectory"
        );
        let copied: Vec<_> = self
            .iter(id)
            .filter(|(time, _)| *time > t)
            .copied()
            .collect();
        let child = self.insert_child(id, t);
        self.node_mut(child).samples = copied;
        child
    }

    fn insert_child(&mut self, parent: ForkId, fork_time: Instant) -> ForkId {
        let child = ForkId(self.nodes.len());
        self.nodes.push(Some(Node::new(Some((parent, fork_time)))));
        self.node_mut(parent).children.push(child);
        child
    }

    /// Detaches and destroys a fork and its descendants; their ids become
    /// invalid.
    pub fn delete_fork(&mut self, id: ForkId) {
        assert!(id != ForkId::ROOT, "cannot delete the root of the family");
        let (parent, _) = self.node(id).parent.expect("non-root node has a parent");
        self.node_mut(parent).children.retain(|&c| c != id);
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let node = self.nodes[current.0]
                .take()
                .expect("descendants are deleted exactly once");
            stack.extend(node.children);
        }
    }

    /// Deletes the samples of `id` strictly before `t`. Panics if a fork
    /// observing `id` would lose its fork point.
    pub fn forget_before(&mut self, id: ForkId, t: Instant) {
        self.assert_no_fork_point_before(id, t);
        self.node_mut(id).samples.retain(|(time, _)| *time >= t);
    }

    /// Any fork point below `id` that lies before `t` could resolve into
    /// the samples about to be deleted (a fork's own samples all follow
    /// its fork point, so deeper anchors before `t` always observe an
    /// ancestor).
    fn assert_no_fork_point_before(&self, id: ForkId, t: Instant) {
        for &child in &self.node(id).children {
            let (_, fork_time) = self.node(child).parent.expect("forks have parents");
            assert!(
                fork_time >= t,
                "forget_before({t}) would orphan a fork at {fork_time}"
            );
            self.assert_no_fork_point_before(child, t);
        }
    }

    /// Deletes the samples of `id` strictly after `t`. Panics if a fork
    /// of `id` would lose its fork point.
    pub fn forget_after(&mut self, id: ForkId, t: Instant) {
        for &child in &self.node(id).children {
            let (_, fork_time) = self.node(child).parent.expect("forks have parents");
            assert!(
                fork_time <= t,
                "forget_after({t}) would orphan a fork at {fork_time}"
            );
        }
        self.node_mut(id).samples.retain(|(time, _)| *time <= t);
    }

    /// The fork-point instant of `id`, if it is a fork.
    pub fn fork_time(&self, id: ForkId) -> Option<Instant> {
        self.node(id).parent.map(|(_, t)| t)
    }
}

impl<F: Frame> Default for DiscreteTrajectory<F> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nbody_geometry::{Barycentric, Position, Velocity};
    use nbody_quantities::Quantity;
    use nbody_quantities::si::*;

    fn dof(x: f64) -> DegreesOfFreedom<Barycentric> {
        DegreesOfFreedom::new(
            Position::new(metres(x), metres(0.0), metres(0.0)),
            Velocity::zero(),
        )
    }

    fn at(t: f64) -> Instant {
        Instant::J2000 + seconds(t)
    }

    fn times(
        trajectory: &DiscreteTrajectory<Barycentric>,
        id: ForkId,
    ) -> Vec<f64> {
        trajectory
            .iter(id)
            .map(|(t, _)| (*t - Instant::J2000).si())
            .collect()
    }

    #[test]
    fn appends_iterate_in_order() {
        let mut trajectory = DiscreteTrajectory::new();
        for t in [0.0, 1.0, 2.0, 3.0] {
            trajectory.append(ForkId::ROOT, at(t), dof(t));
        }
        assert_eq!(times(&trajectory, ForkId::ROOT), vec![0.0, 1.0, 2.0, 3.0]);
        assert_eq!(trajectory.size(ForkId::ROOT), 4);
        assert_eq!(trajectory.front(ForkId::ROOT).unwrap().0, at(0.0));
        assert_eq!(trajectory.back(ForkId::ROOT).unwrap().0, at(3.0));
    }

    #[test]
    #[should_panic(expected = "non-monotonic append")]
    fn non_monotonic_appends_are_fatal() {
        let mut trajectory = DiscreteTrajectory::new();
        trajectory.append(ForkId::ROOT, at(1.0), dof(0.0));
        trajectory.append(ForkId::ROOT, at(1.0), dof(0.0));
    }

    #[test]
    fn forks_observe_the_parent_prefix_and_their_own_suffix() {
        let mut trajectory = DiscreteTrajectory::new();
        for t in [0.0, 1.0, 2.0] {
            trajectory.append(ForkId::ROOT, at(t), dof(t));
        }
        let fork = trajectory.new_fork_at_last(ForkId::ROOT);
        trajectory.append(ForkId::ROOT, at(3.0), dof(3.0));
        trajectory.append(fork, at(2.5), dof(2.5));
        trajectory.append(fork, at(3.5), dof(3.5));

        assert_eq!(times(&trajectory, ForkId::ROOT), vec![0.0, 1.0, 2.0, 3.0]);
        assert_eq!(times(&trajectory, fork), vec![0.0, 1.0, 2.0, 2.5, 3.5]);
        assert_eq!(trajectory.fork_time(fork), Some(at(2.0)));
    }

    #[test]
    fn forks_can_be_forked() {
        let mut trajectory = DiscreteTrajectory::new();
        trajectory.append(ForkId::ROOT, at(0.0), dof(0.0));
        trajectory.append(ForkId::ROOT, at(1.0), dof(1.0));
        let fork = trajectory.new_fork_at_last(ForkId::ROOT);
        trajectory.append(fork, at(2.0), dof(2.0));
        let grandfork = trajectory.new_fork_at_last(fork);
        trajectory.append(grandfork, at(2.5), dof(2.5));
        assert_eq!(times(&trajectory, grandfork), vec![0.0, 1.0, 2.0, 2.5]);
        // A fork anchored in the grandparent's samples sees only the
        // matching prefix.
        let early = trajectory.new_fork_with_copy(fork, at(1.0));
        assert_eq!(times(&trajectory, early), vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn fork_with_copy_duplicates_the_suffix() {
        let mut trajectory = DiscreteTrajectory::new();
        trajectory.append(ForkId::ROOT, at(0.0), dof(0.0));
        trajectory.append(ForkId::ROOT, at(1.0), dof(1.0));
        let fork = trajectory.new_fork_with_copy(ForkId::ROOT, at(0.0));
        assert_eq!(times(&trajectory, fork), vec![0.0, 1.0]);
        trajectory.forget_after(ForkId::ROOT, at(0.0));
        assert_eq!(times(&trajectory, ForkId::ROOT), vec![0.0]);
        assert_eq!(times(&trajectory, fork), vec![0.0, 1.0]);
    }

    #[test]
    fn deleting_a_fork_leaves_the_parent_alone() {
        let mut trajectory = DiscreteTrajectory::new();
        trajectory.append(ForkId::ROOT, at(0.0), dof(0.0));
        let fork = trajectory.new_fork_at_last(ForkId::ROOT);
        trajectory.append(fork, at(1.0), dof(1.0));
        trajectory.delete_fork(fork);
        assert_eq!(times(&trajectory, ForkId::ROOT), vec![0.0]);
    }

    #[test]
    #[should_panic(expected = "use of a deleted fork")]
    fn deleted_fork_handles_are_invalid() {
        let mut trajectory = DiscreteTrajectory::new();
        trajectory.append(ForkId::ROOT, at(0.0), dof(0.0));
        let fork = trajectory.new_fork_at_last(ForkId::ROOT);
        trajectory.delete_fork(fork);
        trajectory.append(fork, at(1.0), dof(1.0));
    }

    #[test]
    fn forget_before_respects_fork_points() {
        let mut trajectory = DiscreteTrajectory::new();
        for t in [0.0, 1.0, 2.0, 3.0] {
            trajectory.append(ForkId::ROOT, at(t), dof(t));
        }
        let fork = trajectory.new_fork_with_copy(ForkId::ROOT, at(2.0));
        trajectory.forget_before(ForkId::ROOT, at(1.5));
        assert_eq!(times(&trajectory, ForkId::ROOT), vec![2.0, 3.0]);
        let _ = fork;
    }

    #[test]
    #[should_panic(expected = "would orphan a fork")]
    fn forget_before_through_a_fork_point_is_fatal() {
        let mut trajectory = DiscreteTrajectory::new();
        for t in [0.0, 1.0, 2.0, 3.0] {
            trajectory.append(ForkId::ROOT, at(t), dof(t));
        }
        let _fork = trajectory.new_fork_with_copy(ForkId::ROOT, at(2.0));
        trajectory.forget_before(ForkId::ROOT, at(2.5));
    }

    #[test]
    #[should_panic(expected = "would orphan a fork")]
    fn forget_after_through_a_fork_point_is_fatal() {
        let mut trajectory = DiscreteTrajectory::new();
        for t in [0.0, 1.0, 2.0] {
            trajectory.append(ForkId::ROOT, at(t), dof(t));
        }
        let _fork = trajectory.new_fork_at_last(ForkId::ROOT);
        trajectory.forget_after(ForkId::ROOT, at(1.0));
    }

    #[test]
    fn serialization_round_trips_the_fork_topology() {
        let mut trajectory = DiscreteTrajectory::new();
        for t in [0.0, 1.0, 2.0] {
            trajectory.append(ForkId::ROOT, at(t), dof(t));
        }
        let fork = trajectory.new_fork_at_last(ForkId::ROOT);
        trajectory.append(fork, at(2.5), dof(2.5));
        let json = serde_json::to_string(&trajectory).unwrap();
        let read: DiscreteTrajectory<Barycentric> = serde_json::from_str(&json).unwrap();
        assert_eq!(read, trajectory);
        assert_eq!(times(&read, fork), vec![0.0, 1.0, 2.0, 2.5]);
    }
}
