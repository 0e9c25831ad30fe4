//! The simulated robot and the board it walks on.

use std::fmt::Write;

use crate::value::Direction;

/// width and height of the square board
pub const BOARD_SIZE: i64 = 5;

const BOARD_RULE: &str = "+---+---+---+---+---+";

/// Where the robot stands once it has been placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub x: i64,
    pub y: i64,
    pub facing: Direction,
}

/// The robot. Until the first successful PLACE it has no position, and
/// motion and turning do nothing.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Robot {
    placement: Option<Placement>,
}

pub fn on_board(x: i64, y: i64) -> bool {
    (0..BOARD_SIZE).contains(&x) && (0..BOARD_SIZE).contains(&y)
}

impl Robot {
    pub fn placement(&self) -> Option<Placement> {
        self.placement
    }

    pub fn is_placed(&self) -> bool {
        self.placement.is_some()
    }

    /// Puts the robot on the board. Coordinates off the board leave the
    /// robot as it was and return false.
    pub fn place(&mut self, x: i64, y: i64, facing: Direction) -> bool {
        if !on_board(x, y) {
            return false;
        }
        self.placement = Some(Placement { x, y, facing });
        true
    }

    /// one step forward, unless that would leave the board
    pub fn advance(&mut self) {
        if let Some(p) = &mut self.placement {
            let (dx, dy) = p.facing.delta();
            let (x, y) = (p.x + dx, p.y + dy);
            if on_board(x, y) {
                p.x = x;
                p.y = y;
            }
        }
    }

    pub fn turn_left(&mut self) {
        if let Some(p) = &mut self.placement {
            p.facing = p.facing.left();
        }
    }

    pub fn turn_right(&mut self) {
        if let Some(p) = &mut self.placement {
            p.facing = p.facing.right();
        }
    }

    /// the `REPORT` line, including its newline
    pub fn report(&self) -> String {
        match self.placement {
            Some(Placement { x, y, facing }) => format!("{},{},{}\n", x, y, facing),
            None => "Robot not placed\n".into(),
        }
    }

    /// Renders the board, northmost row first, with an arrow in the robot's
    /// cell pointing where it faces.
    pub fn board(&self) -> String {
        let mut out = String::new();
        for y in (0..BOARD_SIZE).rev() {
            let cells: Vec<&str> = (0..BOARD_SIZE)
                .map(|x| match self.placement {
                    Some(p) if p.x == x && p.y == y => p.facing.glyph(),
                    _ => " ",
                })
                .collect();
            // writing into a String can not fail
            let _ = writeln!(out, "{}", BOARD_RULE);
            let _ = writeln!(out, "| {} |", cells.join(" | "));
        }
        let _ = writeln!(out, "{}", BOARD_RULE);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unplaced_robot_ignores_motion() {
        let mut robot = Robot::default();
        robot.advance();
        robot.turn_left();
        robot.turn_right();
        assert!(!robot.is_placed());
        assert_eq!(robot.report(), "Robot not placed\n");
    }

    #[test]
    fn test_place_bounds() {
        let mut robot = Robot::default();
        for (x, y) in [(-1, 0), (0, -1), (5, 0), (0, 5), (7, 7)] {
            assert!(!robot.place(x, y, Direction::North));
            assert!(!robot.is_placed());
        }
        assert!(robot.place(4, 4, Direction::South));
        assert_eq!(robot.report(), "4,4,SOUTH\n");
        // a later bad PLACE keeps the old position
        assert!(!robot.place(5, 5, Direction::North));
        assert_eq!(robot.report(), "4,4,SOUTH\n");
    }

    #[test]
    fn test_edges_stop_motion() {
        let cases = [
            (0, 4, Direction::North),
            (4, 0, Direction::East),
            (0, 0, Direction::South),
            (0, 0, Direction::West),
        ];
        for (x, y, facing) in cases {
            let mut robot = Robot::default();
            robot.place(x, y, facing);
            robot.advance();
            assert_eq!(robot.placement(), Some(Placement { x, y, facing }));
        }
    }

    #[test]
    fn test_board() {
        let mut robot = Robot::default();
        robot.place(1, 3, Direction::East);
        let want = "\
+---+---+---+---+---+
|   |   |   |   |   |
+---+---+---+---+---+
|   | > |   |   |   |
+---+---+---+---+---+
|   |   |   |   |   |
+---+---+---+---+---+
|   |   |   |   |   |
+---+---+---+---+---+
|   |   |   |   |   |
+---+---+---+---+---+
";
        assert_eq!(robot.board(), want);
    }
}
