use crate::annotation::{Annotation, Modulator};

/// Width of every overlay block, in simulation ms.
pub const BLOCK_WIDTH: f64 = 250.0;

/// One overlay rectangle in data coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
    pub modulator: Modulator,
}

/// Lay out the annotation as stacked blocks.
///
/// Each time step starts a new stack at `baseline`; every entry is
/// `level * unit` tall and sits directly on the previous one.
pub fn stack_blocks(annotation: &Annotation, baseline: f64, unit: f64, width: f64) -> Vec<Block> {
    let mut out = Vec::new();
    for (&time, entries) in annotation {
        let x0 = time as f64;
        let mut y = baseline;
        for (modulator, level) in entries {
            let height = unit * f64::from(*level);
            out.push(Block {
                x0,
                y0: y,
                x1: x0 + width,
                y1: y + height,
                modulator: modulator.clone(),
            });
            y += height;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn stacks_contiguously() {
        let mut annotation = Annotation::new();
        annotation.insert(
            3000,
            vec![(Modulator::Dopamine, 1), (Modulator::Serotonin, 2)],
        );
        let h = 0.5;

        let blocks = stack_blocks(&annotation, 10.0, h, BLOCK_WIDTH);

        assert_eq!(
            blocks,
            vec![
                Block {
                    x0: 3000.0,
                    y0: 10.0,
                    x1: 3250.0,
                    y1: 10.5,
                    modulator: Modulator::Dopamine,
                },
                Block {
                    x0: 3000.0,
                    y0: 10.5,
                    x1: 3250.0,
                    y1: 11.5,
                    modulator: Modulator::Serotonin,
                },
            ]
        );
        assert_eq!(blocks[0].y1 - blocks[0].y0, h);
        assert_eq!(blocks[1].y1 - blocks[1].y0, 2.0 * h);
        assert_eq!(blocks[1].y1 - blocks[0].y0, 3.0 * h);
    }

    #[test]
    fn each_step_restarts_at_baseline() {
        let mut annotation = Annotation::new();
        annotation.insert(0, vec![(Modulator::Noradrenaline, 2)]);
        annotation.insert(750, vec![(Modulator::Noradrenaline, 1)]);

        let blocks = stack_blocks(&annotation, 0.0, 1.0, 100.0);

        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1].y0, 0.0);
        assert_eq!(blocks[1].x0, 750.0);
        assert_eq!(blocks[1].x1, 850.0);
    }

    #[test]
    fn empty_annotation_yields_no_blocks() {
        assert!(stack_blocks(&Annotation::new(), 0.0, 1.0, BLOCK_WIDTH).is_empty());
    }
}
