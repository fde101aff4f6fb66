//! Path data (`d` attribute) syntax: parsing into [`PathShape`] and writing
//! it back out.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{MorphError, Result, ShapeError};
use crate::geometry::{Contour, PathShape, Segment};
use crate::math::{Point2, Vector2};

/// Formatting options for written path data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PathDataOptions {
    /// Round numbers to this many decimals. `None` writes the shortest
    /// representation that reads back to the same value.
    pub precision: Option<usize>,
}

/// Parses path data into a shape.
///
/// Each `M`/`m` starts a new contour and `Z`/`z` closes it; a drawing
/// command after `Z` without a `M` starts a new contour at the closed
/// contour's start point.
///
/// # Errors
///
/// Returns `MorphError::MalformedShape` for syntax errors, truncated
/// commands and numbers that overflow to infinity.
pub fn parse_path_data(data: &str) -> Result<PathShape> {
    let shape = PathParser::new(data).parse()?;
    shape.validate()?;
    Ok(shape)
}

/// Writes a shape as absolute path data.
#[must_use]
pub fn write_path_data(shape: &PathShape, options: &PathDataOptions) -> String {
    shape
        .contours
        .iter()
        .map(|contour| ContourData { contour, options }.to_string())
        .collect()
}

/// Writes one path data string per contour key. Contours without a key are
/// collected under the empty string.
#[must_use]
pub fn write_path_data_by_layer(
    shape: &PathShape,
    options: &PathDataOptions,
) -> BTreeMap<String, String> {
    let mut layers: BTreeMap<String, String> = BTreeMap::new();
    for contour in &shape.contours {
        let layer = contour.key.clone().unwrap_or_default();
        layers
            .entry(layer)
            .or_default()
            .push_str(&ContourData { contour, options }.to_string());
    }
    layers
}

impl PathShape {
    /// Parses path data. Same as [`parse_path_data`].
    ///
    /// # Errors
    ///
    /// See [`parse_path_data`].
    pub fn from_path_data(data: &str) -> Result<Self> {
        parse_path_data(data)
    }

    /// Writes the shape as path data with default formatting.
    #[must_use]
    pub fn to_path_data(&self) -> String {
        write_path_data(self, &PathDataOptions::default())
    }

    /// Writes one path data string per contour key.
    #[must_use]
    pub fn to_path_data_by_layer(&self) -> BTreeMap<String, String> {
        write_path_data_by_layer(self, &PathDataOptions::default())
    }
}

impl FromStr for PathShape {
    type Err = MorphError;

    fn from_str(s: &str) -> Result<Self> {
        parse_path_data(s)
    }
}

/// One contour in absolute path-data form.
struct ContourData<'a> {
    contour: &'a Contour,
    options: &'a PathDataOptions,
}

impl fmt::Display for ContourData<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let num = |v: f64| format_number(v, self.options.precision);
        let pt = |p: &Point2| format!("{} {}", num(p.x), num(p.y));

        write!(f, "M{}", pt(&self.contour.start))?;
        for seg in &self.contour.segments {
            match seg {
                Segment::Line { to, .. } => write!(f, "L{}", pt(to))?,
                Segment::Quadratic { ctrl, to, .. } => write!(f, "Q{} {}", pt(ctrl), pt(to))?,
                Segment::Cubic {
                    ctrl1, ctrl2, to, ..
                } => write!(f, "C{} {} {}", pt(ctrl1), pt(ctrl2), pt(to))?,
                Segment::Arc {
                    to,
                    radii,
                    x_rotation,
                    large_arc,
                    sweep,
                    ..
                } => write!(
                    f,
                    "A{} {} {} {} {} {}",
                    num(radii.x),
                    num(radii.y),
                    num(*x_rotation),
                    u8::from(*large_arc),
                    u8::from(*sweep),
                    pt(to)
                )?,
            }
        }
        if self.contour.closed {
            f.write_str("Z")?;
        }
        Ok(())
    }
}

fn format_number(v: f64, precision: Option<usize>) -> String {
    let mut s = match precision {
        Some(p) => {
            let mut s = format!("{v:.p$}");
            if s.contains('.') {
                let trimmed = s.trim_end_matches('0').trim_end_matches('.').len();
                s.truncate(trimmed);
            }
            s
        }
        None => format!("{v}"),
    };
    if s == "-0" {
        s.remove(0);
    }
    s
}

/// Byte-level cursor over path data.
struct PathParser<'a> {
    data: &'a str,
    pos: usize,
    contours: Vec<Contour>,
    current: Option<Contour>,
    cursor: Point2,
    subpath_start: Point2,
    /// Last control point of the previous command, for `S`/`T` reflection.
    last_cubic_ctrl: Option<Point2>,
    last_quad_ctrl: Option<Point2>,
}

impl<'a> PathParser<'a> {
    fn new(data: &'a str) -> Self {
        Self {
            data,
            pos: 0,
            contours: Vec::new(),
            current: None,
            cursor: Point2::origin(),
            subpath_start: Point2::origin(),
            last_cubic_ctrl: None,
            last_quad_ctrl: None,
        }
    }

    fn parse(mut self) -> Result<PathShape> {
        let mut first = true;
        loop {
            self.skip_separators();
            let Some(&byte) = self.data.as_bytes().get(self.pos) else {
                break;
            };
            if !byte.is_ascii_alphabetic() {
                return Err(self.error("expected a command letter"));
            }
            if first && !matches!(byte, b'M' | b'm') {
                return Err(self.error("path data must start with a move command"));
            }
            first = false;
            self.pos += 1;
            self.command(byte)?;
        }
        self.finish_contour();
        Ok(PathShape::new(self.contours))
    }

    fn command(&mut self, cmd: u8) -> Result<()> {
        let relative = cmd.is_ascii_lowercase();
        let upper = cmd.to_ascii_uppercase();
        if upper == b'Z' {
            self.close();
            return Ok(());
        }
        if upper == b'M' {
            let p = self.point(relative)?;
            self.finish_contour();
            self.current = Some(Contour::new(p));
            self.cursor = p;
            self.subpath_start = p;
            self.clear_ctrl();
            // Extra coordinate pairs after a move are implicit line-tos.
            while self.at_number() {
                self.draw(b'L', relative)?;
            }
            return Ok(());
        }
        if !matches!(upper, b'L' | b'H' | b'V' | b'C' | b'S' | b'Q' | b'T' | b'A') {
            return Err(self.error(&format!("unknown command '{}'", char::from(cmd))));
        }
        self.draw(upper, relative)?;
        while self.at_number() {
            self.draw(upper, relative)?;
        }
        Ok(())
    }

    /// Parses the arguments of one drawing command and appends its segment.
    fn draw(&mut self, upper: u8, relative: bool) -> Result<()> {
        let from = self.cursor;
        let base = if relative { from } else { Point2::origin() };
        let mut cubic_ctrl = None;
        let mut quad_ctrl = None;

        let segment = match upper {
            b'L' => Segment::line(from, self.point(relative)?),
            b'H' => {
                let x = self.number()? + if relative { from.x } else { 0.0 };
                Segment::line(from, Point2::new(x, from.y))
            }
            b'V' => {
                let y = self.number()? + if relative { from.y } else { 0.0 };
                Segment::line(from, Point2::new(from.x, y))
            }
            b'C' => {
                let ctrl1 = self.point(relative)?;
                let ctrl2 = self.point(relative)?;
                let to = self.point(relative)?;
                cubic_ctrl = Some(ctrl2);
                Segment::Cubic {
                    from,
                    ctrl1,
                    ctrl2,
                    to,
                }
            }
            b'S' => {
                let ctrl1 = reflect(self.last_cubic_ctrl, from);
                let ctrl2 = self.point(relative)?;
                let to = self.point(relative)?;
                cubic_ctrl = Some(ctrl2);
                Segment::Cubic {
                    from,
                    ctrl1,
                    ctrl2,
                    to,
                }
            }
            b'Q' => {
                let ctrl = self.point(relative)?;
                let to = self.point(relative)?;
                quad_ctrl = Some(ctrl);
                Segment::Quadratic { from, ctrl, to }
            }
            b'T' => {
                let ctrl = reflect(self.last_quad_ctrl, from);
                let to = self.point(relative)?;
                quad_ctrl = Some(ctrl);
                Segment::Quadratic { from, ctrl, to }
            }
            _ => {
                let rx = self.number()?;
                let ry = self.number()?;
                let x_rotation = self.number()?;
                let large_arc = self.flag()?;
                let sweep = self.flag()?;
                let to = self.raw_point()? + base.coords;
                Segment::Arc {
                    from,
                    to,
                    radii: Vector2::new(rx, ry),
                    x_rotation,
                    large_arc,
                    sweep,
                }
            }
        };

        self.push(segment);
        self.last_cubic_ctrl = cubic_ctrl;
        self.last_quad_ctrl = quad_ctrl;
        Ok(())
    }

    fn push(&mut self, segment: Segment) {
        let start = self.cursor;
        self.cursor = segment.end();
        self.current
            .get_or_insert_with(|| Contour::new(start))
            .segments
            .push(segment);
    }

    fn close(&mut self) {
        if let Some(contour) = self.current.as_mut() {
            contour.closed = true;
        }
        self.finish_contour();
        self.cursor = self.subpath_start;
        self.clear_ctrl();
    }

    fn finish_contour(&mut self) {
        if let Some(contour) = self.current.take() {
            self.contours.push(contour);
        }
    }

    fn clear_ctrl(&mut self) {
        self.last_cubic_ctrl = None;
        self.last_quad_ctrl = None;
    }

    fn point(&mut self, relative: bool) -> Result<Point2> {
        let p = self.raw_point()?;
        Ok(if relative { p + self.cursor.coords } else { p })
    }

    fn raw_point(&mut self) -> Result<Point2> {
        let x = self.number()?;
        let y = self.number()?;
        Ok(Point2::new(x, y))
    }

    fn skip_separators(&mut self) {
        let bytes = self.data.as_bytes();
        while bytes
            .get(self.pos)
            .is_some_and(|b| b.is_ascii_whitespace() || *b == b',')
        {
            self.pos += 1;
        }
    }

    fn at_number(&mut self) -> bool {
        self.skip_separators();
        self.data
            .as_bytes()
            .get(self.pos)
            .is_some_and(|b| b.is_ascii_digit() || matches!(b, b'-' | b'+' | b'.'))
    }

    fn number(&mut self) -> Result<f64> {
        self.skip_separators();
        let bytes = self.data.as_bytes();
        let start = self.pos;
        let mut end = start;
        if matches!(bytes.get(end), Some(b'+' | b'-')) {
            end += 1;
        }
        let digits = |from: usize| {
            bytes[from..]
                .iter()
                .take_while(|b| b.is_ascii_digit())
                .count()
        };
        let int_digits = digits(end);
        end += int_digits;
        let mut frac_digits = 0;
        if bytes.get(end) == Some(&b'.') {
            frac_digits = digits(end + 1);
            end += 1 + frac_digits;
        }
        if int_digits + frac_digits == 0 {
            return Err(self.error("expected a number"));
        }
        if matches!(bytes.get(end), Some(b'e' | b'E')) {
            let mut exp = end + 1;
            if matches!(bytes.get(exp), Some(b'+' | b'-')) {
                exp += 1;
            }
            let exp_digits = digits(exp);
            if exp_digits > 0 {
                end = exp + exp_digits;
            }
        }

        let value: f64 = self.data[start..end]
            .parse()
            .map_err(|_| self.error("invalid number"))?;
        if !value.is_finite() {
            return Err(self.error("number out of range"));
        }
        self.pos = end;
        Ok(value)
    }

    fn flag(&mut self) -> Result<bool> {
        self.skip_separators();
        let value = match self.data.as_bytes().get(self.pos) {
            Some(b'0') => false,
            Some(b'1') => true,
            _ => return Err(self.error("expected an arc flag (0 or 1)")),
        };
        self.pos += 1;
        Ok(value)
    }

    fn error(&self, message: &str) -> MorphError {
        ShapeError::Syntax {
            offset: self.pos,
            message: message.to_owned(),
        }
        .into()
    }
}

/// Reflects the previous control point about `about`; without one the
/// control point coincides with `about`.
fn reflect(ctrl: Option<Point2>, about: Point2) -> Point2 {
    ctrl.map_or(about, |c| about + (about - c))
}
