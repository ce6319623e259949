//! Minimal SVG path-data interpreter (straight segments only)

use lumen_core::{LumenError, Result, Vec2};

/// A parsed path command. Coordinates are as written; `relative` commands are
/// resolved against the current point when traced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo { to: Vec2, relative: bool },
    LineTo { to: Vec2, relative: bool },
    Horizontal { x: f32, relative: bool },
    Vertical { y: f32, relative: bool },
    Close,
    /// Any of `C S Q T A`. Not sampled; only moves the pen to `end`.
    Curve { end: Vec2, relative: bool },
}

/// One straight segment in absolute coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub from: Vec2,
    pub to: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Command(char),
    Number(f32),
}

fn tokenize(d: &str) -> Result<Vec<Token>> {
    let bytes = d.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i] as char;
        if c.is_whitespace() || c == ',' {
            i += 1;
        } else if c.is_ascii_alphabetic() && c != 'e' && c != 'E' {
            tokens.push(Token::Command(c));
            i += 1;
        } else if c.is_ascii_digit() || matches!(c, '-' | '+' | '.') {
            let start = i;
            let mut seen_dot = false;
            let mut seen_exp = false;
            if matches!(c, '-' | '+') {
                i += 1;
            }
            while i < bytes.len() {
                let n = bytes[i] as char;
                if n.is_ascii_digit() {
                    i += 1;
                } else if n == '.' && !seen_dot && !seen_exp {
                    // "1.5.5" is two numbers: 1.5 and .5
                    seen_dot = true;
                    i += 1;
                } else if (n == 'e' || n == 'E') && !seen_exp {
                    seen_exp = true;
                    i += 1;
                    if i < bytes.len() && matches!(bytes[i] as char, '-' | '+') {
                        i += 1;
                    }
                } else {
                    break;
                }
            }
            let text = &d[start..i];
            let value = text
                .parse::<f32>()
                .map_err(|_| LumenError::Parse(format!("bad number '{text}' in path data")))?;
            tokens.push(Token::Number(value));
        } else {
            return Err(LumenError::Parse(format!(
                "unexpected character '{c}' in path data"
            )));
        }
    }
    Ok(tokens)
}

/// Parse `d` attribute text into commands.
///
/// Implicit repetition is honored: extra coordinate pairs after `M` become
/// line-tos, extra parameters after any other command repeat it.
pub fn parse_path_data(d: &str) -> Result<Vec<PathCommand>> {
    let tokens = tokenize(d)?;
    let mut commands = Vec::new();
    let mut i = 0;

    while i < tokens.len() {
        let Token::Command(letter) = tokens[i] else {
            return Err(LumenError::Parse(
                "path data must start with a command".to_string(),
            ));
        };
        i += 1;

        let relative = letter.is_ascii_lowercase();
        let upper = letter.to_ascii_uppercase();
        let arity = match upper {
            'M' | 'L' | 'T' => 2,
            'H' | 'V' => 1,
            'Z' => 0,
            'C' => 6,
            'S' | 'Q' => 4,
            'A' => 7,
            other => {
                return Err(LumenError::Parse(format!(
                    "unknown path command '{other}'"
                )))
            }
        };

        if arity == 0 {
            commands.push(PathCommand::Close);
            continue;
        }

        let mut first = true;
        loop {
            let args: Vec<f32> = tokens[i..]
                .iter()
                .take(arity)
                .map_while(|t| match t {
                    Token::Number(n) => Some(*n),
                    Token::Command(_) => None,
                })
                .collect();
            if args.len() < arity {
                if first {
                    return Err(LumenError::Parse(format!(
                        "command '{letter}' expects {arity} parameters"
                    )));
                }
                // Leftover numbers shorter than one group are dropped
                i += args.len();
                break;
            }
            i += arity;

            let command = match upper {
                'M' if first => PathCommand::MoveTo {
                    to: Vec2::new(args[0], args[1]),
                    relative,
                },
                'M' | 'L' => PathCommand::LineTo {
                    to: Vec2::new(args[0], args[1]),
                    relative,
                },
                'H' => PathCommand::Horizontal { x: args[0], relative },
                'V' => PathCommand::Vertical { y: args[0], relative },
                _ => PathCommand::Curve {
                    end: Vec2::new(args[arity - 2], args[arity - 1]),
                    relative,
                },
            };
            commands.push(command);
            first = false;

            if !matches!(tokens.get(i), Some(Token::Number(_))) {
                break;
            }
        }
    }
    Ok(commands)
}

/// Resolve commands into absolute straight segments, scaled by `scale`.
/// Moves and curves emit nothing; `Z` closes back to the subpath start.
pub fn trace_segments(commands: &[PathCommand], scale: f32) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut pen = Vec2::ZERO;
    let mut subpath_start = Vec2::ZERO;

    let resolve = |pen: Vec2, p: Vec2, relative: bool| {
        if relative {
            pen + p * scale
        } else {
            p * scale
        }
    };

    for command in commands {
        match *command {
            PathCommand::MoveTo { to, relative } => {
                pen = resolve(pen, to, relative);
                subpath_start = pen;
            }
            PathCommand::LineTo { to, relative } => {
                let next = resolve(pen, to, relative);
                segments.push(Segment { from: pen, to: next });
                pen = next;
            }
            PathCommand::Horizontal { x, relative } => {
                let next = if relative {
                    Vec2::new(pen.x + x * scale, pen.y)
                } else {
                    Vec2::new(x * scale, pen.y)
                };
                segments.push(Segment { from: pen, to: next });
                pen = next;
            }
            PathCommand::Vertical { y, relative } => {
                let next = if relative {
                    Vec2::new(pen.x, pen.y + y * scale)
                } else {
                    Vec2::new(pen.x, y * scale)
                };
                segments.push(Segment { from: pen, to: next });
                pen = next;
            }
            PathCommand::Close => {
                if pen != subpath_start {
                    segments.push(Segment {
                        from: pen,
                        to: subpath_start,
                    });
                }
                pen = subpath_start;
            }
            PathCommand::Curve { end, relative } => {
                pen = resolve(pen, end, relative);
            }
        }
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_absolute_and_relative() {
        let cmds = parse_path_data("M10 20 L30,40 h5 v-5 Z").unwrap();
        assert_eq!(
            cmds,
            vec![
                PathCommand::MoveTo { to: Vec2::new(10.0, 20.0), relative: false },
                PathCommand::LineTo { to: Vec2::new(30.0, 40.0), relative: false },
                PathCommand::Horizontal { x: 5.0, relative: true },
                PathCommand::Vertical { y: -5.0, relative: true },
                PathCommand::Close,
            ]
        );
    }

    #[test]
    fn implicit_lineto_after_move() {
        let cmds = parse_path_data("m0 0 10 0 0 10").unwrap();
        assert_eq!(cmds.len(), 3);
        assert!(matches!(cmds[0], PathCommand::MoveTo { relative: true, .. }));
        assert!(matches!(cmds[1], PathCommand::LineTo { relative: true, .. }));
        assert!(matches!(cmds[2], PathCommand::LineTo { relative: true, .. }));
    }

    #[test]
    fn compact_numbers() {
        let cmds = parse_path_data("M-1.5-2.5L.5.5 1e1,2E-1").unwrap();
        assert_eq!(
            cmds[0],
            PathCommand::MoveTo { to: Vec2::new(-1.5, -2.5), relative: false }
        );
        assert_eq!(
            cmds[1],
            PathCommand::LineTo { to: Vec2::new(0.5, 0.5), relative: false }
        );
        assert_eq!(
            cmds[2],
            PathCommand::LineTo { to: Vec2::new(10.0, 0.2), relative: false }
        );
    }

    #[test]
    fn curves_only_move_the_pen() {
        let cmds = parse_path_data("M0 0 C 1 1 2 2 10 0 L 10 10").unwrap();
        assert_eq!(cmds[1], PathCommand::Curve { end: Vec2::new(10.0, 0.0), relative: false });
        let segs = trace_segments(&cmds, 1.0);
        assert_eq!(segs, vec![Segment { from: Vec2::new(10.0, 0.0), to: Vec2::new(10.0, 10.0) }]);
    }

    #[test]
    fn arc_end_point_is_last_pair() {
        let cmds = parse_path_data("M0 0 a5 5 0 0 1 10 0").unwrap();
        assert_eq!(cmds[1], PathCommand::Curve { end: Vec2::new(10.0, 0.0), relative: true });
    }

    #[test]
    fn relative_tracing_and_close() {
        let cmds = parse_path_data("m10 10 h10 v10 z").unwrap();
        let segs = trace_segments(&cmds, 2.0);
        assert_eq!(segs.len(), 3);
        assert_eq!(segs[0].from, Vec2::new(20.0, 20.0));
        assert_eq!(segs[0].to, Vec2::new(40.0, 20.0));
        assert_eq!(segs[1].to, Vec2::new(40.0, 40.0));
        assert_eq!(segs[2].to, Vec2::new(20.0, 20.0));
    }

    #[test]
    fn malformed_data_is_a_parse_error() {
        assert!(parse_path_data("10 10 L 5 5").is_err());
        assert!(parse_path_data("M 10").is_err());
        assert!(parse_path_data("M 0 0 X 1 1").is_err());
        assert!(parse_path_data("M 0 0 L 1 #").is_err());
    }
}
