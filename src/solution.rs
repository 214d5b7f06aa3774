use crate::domain::Domain;

/// Check a goal-to-start path. Every state must be reachable from the one
/// after it by a single operator, and the first state must be a goal.
/// Returns the total cost, or `None` if the path is invalid.
pub fn verify_path<D: Domain>(domain: &D, path: &[D::State]) -> Option<u32>
where
    D::State: PartialEq,
{
    if !domain.is_goal(path.first()?) {
        return None;
    }

    let mut cost = 0;
    for pair in path.windows(2).rev() {
        let (next, prev) = (&pair[0], &pair[1]);
        let mut state = prev.clone();
        let mut step = None;
        for i in 0..domain.nops(&state) {
            let op = domain.nthop(&state, i);
            let edge = domain.apply(&mut state, op);
            if state == *next {
                step = Some(step.map_or(edge.cost, |c: u32| c.min(edge.cost)));
            }
            domain.undo(&mut state, &edge);
        }
        cost += step?;
    }
    Some(cost)
}
