use crate::model::Candidate;

/// Largest candidates first, at most `top_k` of them.
///
/// Boxes smaller than `min_area` are dropped before ranking. Equal areas are
/// ordered top-to-bottom, then left-to-right, so output never depends on
/// contour discovery order.
pub fn apply(mut candidates: Vec<Candidate>, top_k: usize, min_area: u64) -> Vec<Candidate> {
    candidates.retain(|c| c.area() >= min_area);
    candidates.sort_by(|a, b| {
        b.area()
            .cmp(&a.area())
            .then(a.bbox.y.cmp(&b.bbox.y))
            .then(a.bbox.x.cmp(&b.bbox.x))
    });
    candidates.truncate(top_k);
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BoundingBox;

    fn candidate(x: u32, y: u32, width: u32, height: u32) -> Candidate {
        Candidate {
            bbox: BoundingBox {
                x,
                y,
                width,
                height,
            },
            contour: Vec::new(),
        }
    }

    #[test]
    fn test_sorts_by_area_descending_and_truncates() {
        let input = vec![
            candidate(0, 0, 5, 5),
            candidate(0, 0, 20, 20),
            candidate(0, 0, 10, 10),
            candidate(0, 0, 30, 2),
            candidate(0, 0, 15, 15),
        ];
        let ranked = apply(input, 4, 0);
        let areas: Vec<u64> = ranked.iter().map(|c| c.area()).collect();
        assert_eq!(areas, vec![400, 225, 100, 60]);
    }

    #[test]
    fn test_fewer_than_top_k_keeps_all() {
        let ranked = apply(vec![candidate(0, 0, 3, 3)], 4, 0);
        assert_eq!(ranked.len(), 1);
        assert!(apply(Vec::new(), 4, 0).is_empty());
    }

    #[test]
    fn test_ties_are_ordered_by_position() {
        let input = vec![
            candidate(50, 10, 4, 4),
            candidate(10, 10, 4, 4),
            candidate(0, 2, 4, 4),
        ];
        let ranked = apply(input, 3, 0);
        let origins: Vec<(u32, u32)> = ranked.iter().map(|c| (c.bbox.x, c.bbox.y)).collect();
        assert_eq!(origins, vec![(0, 2), (10, 10), (50, 10)]);
    }

    #[test]
    fn test_min_area_floor() {
        let input = vec![candidate(0, 0, 2, 2), candidate(0, 0, 10, 10)];
        let ranked = apply(input, 4, 50);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].area(), 100);
    }
}
