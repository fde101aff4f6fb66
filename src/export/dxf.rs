//! CAD exchange (DXF) export: polylines with bulges for lines and circular
//! arcs, splines for Bézier curves.

use std::fmt;

use crate::discretize::{discretize_contour, AccuracySpec};
use crate::error::{OptionsError, Result};
use crate::geometry::{Contour, PathShape, Segment};
use crate::math::arc_2d::bulge_from_sweep;
use crate::math::Point2;

/// Parameters controlling DXF export.
#[derive(Debug, Clone, PartialEq)]
pub struct DxfOptions {
    /// Layer for contours without a key.
    pub default_layer: String,
    /// Chord tolerance for elliptical arcs, which DXF polylines cannot carry.
    pub flatten_tolerance: f64,
}

impl Default for DxfOptions {
    fn default() -> Self {
        Self {
            default_layer: "0".to_owned(),
            flatten_tolerance: 0.01,
        }
    }
}

/// A polyline vertex; `bulge` describes the edge to the next vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DxfVertex {
    pub point: Point2,
    pub bulge: f64,
}

/// One exported entity.
#[derive(Debug, Clone, PartialEq)]
pub enum DxfEntity {
    /// `LWPOLYLINE`.
    Polyline {
        layer: String,
        vertices: Vec<DxfVertex>,
        closed: bool,
    },
    /// `SPLINE` holding a single Bézier span.
    Spline {
        layer: String,
        degree: u8,
        control_points: Vec<Point2>,
        knots: Vec<f64>,
    },
}

/// Converts a shape into DXF entities.
#[derive(Debug)]
pub struct DxfExport<'a> {
    shape: &'a PathShape,
    options: &'a DxfOptions,
}

impl<'a> DxfExport<'a> {
    /// Creates a new export operation.
    #[must_use]
    pub fn new(shape: &'a PathShape, options: &'a DxfOptions) -> Self {
        Self { shape, options }
    }

    /// Executes the export, in contour order.
    ///
    /// # Errors
    ///
    /// Returns `MorphError::MalformedShape` for invalid geometry and
    /// `MorphError::InvalidOptions` for a non-positive flatten tolerance or
    /// one that needs too many points.
    pub fn execute(&self) -> Result<Vec<DxfEntity>> {
        let tol = self.options.flatten_tolerance;
        if !(tol.is_finite() && tol > 0.0) {
            return Err(OptionsError::NotPositive {
                name: "flatten tolerance",
                value: tol,
            }
            .into());
        }
        self.shape.validate()?;
        let mut entities = Vec::new();
        for contour in &self.shape.contours {
            self.export_contour(contour, &mut entities)?;
        }
        Ok(entities)
    }

    fn export_contour(&self, contour: &Contour, out: &mut Vec<DxfEntity>) -> Result<()> {
        let layer = contour
            .key
            .clone()
            .unwrap_or_else(|| self.options.default_layer.clone());
        let has_curves = contour
            .segments
            .iter()
            .any(|s| matches!(s, Segment::Quadratic { .. } | Segment::Cubic { .. }));

        // A closed contour made only of lines and arcs maps onto one closed
        // polyline; otherwise the closing edge becomes explicit.
        let chain = if contour.closed && has_curves {
            contour.closed_chain()
        } else {
            contour.segments.clone()
        };

        let mut run = vec![DxfVertex {
            point: contour.start,
            bulge: 0.0,
        }];
        for seg in &chain {
            match *seg {
                Segment::Quadratic { from, ctrl, to } => {
                    flush(&layer, &mut run, false, out);
                    out.push(bezier(&layer, vec![from, ctrl, to]));
                    run.push(DxfVertex {
                        point: to,
                        bulge: 0.0,
                    });
                }
                Segment::Cubic {
                    from,
                    ctrl1,
                    ctrl2,
                    to,
                } => {
                    flush(&layer, &mut run, false, out);
                    out.push(bezier(&layer, vec![from, ctrl1, ctrl2, to]));
                    run.push(DxfVertex {
                        point: to,
                        bulge: 0.0,
                    });
                }
                Segment::Line { to, .. } => run.push(DxfVertex {
                    point: to,
                    bulge: 0.0,
                }),
                Segment::Arc { to, .. } => self.push_arc(seg, to, &mut run)?,
            }
        }

        let closed = contour.closed && !has_curves;
        if closed && run.len() > 1 {
            if let Some(last) = run.last() {
                if last.point == contour.start {
                    run.pop();
                }
            }
        }
        flush(&layer, &mut run, closed, out);
        Ok(())
    }

    fn push_arc(&self, seg: &Segment, to: Point2, run: &mut Vec<DxfVertex>) -> Result<()> {
        match seg.arc_params() {
            Some(arc) if arc.is_circular() => {
                if let Some(last) = run.last_mut() {
                    last.bulge = bulge_from_sweep(arc.sweep);
                }
                run.push(DxfVertex {
                    point: to,
                    bulge: 0.0,
                });
            }
            Some(_) => {
                let piece = Contour {
                    start: seg.start(),
                    segments: vec![*seg],
                    closed: false,
                    key: None,
                };
                let polygon = discretize_contour(
                    &piece,
                    AccuracySpec::Tolerance(self.options.flatten_tolerance),
                )?;
                run.extend(polygon.points.iter().skip(1).map(|&point| DxfVertex {
                    point,
                    bulge: 0.0,
                }));
            }
            None => run.push(DxfVertex {
                point: to,
                bulge: 0.0,
            }),
        }
        Ok(())
    }
}

/// Emits the pending polyline run if it has an edge, leaving it empty.
fn flush(layer: &str, run: &mut Vec<DxfVertex>, closed: bool, out: &mut Vec<DxfEntity>) {
    if run.len() > 1 {
        out.push(DxfEntity::Polyline {
            layer: layer.to_owned(),
            vertices: std::mem::take(run),
            closed,
        });
    } else {
        run.clear();
    }
}

fn bezier(layer: &str, control_points: Vec<Point2>) -> DxfEntity {
    let order = control_points.len();
    let mut knots = vec![0.0; order];
    knots.extend(std::iter::repeat(1.0).take(order));
    #[allow(clippy::cast_possible_truncation)]
    let degree = (order - 1) as u8;
    DxfEntity::Spline {
        layer: layer.to_owned(),
        degree,
        control_points,
        knots,
    }
}

/// Converts a shape straight into a DXF document.
///
/// # Errors
///
/// See [`DxfExport::execute`].
pub fn to_dxf(shape: &PathShape, options: &DxfOptions) -> Result<String> {
    Ok(write_dxf(&DxfExport::new(shape, options).execute()?))
}

/// Writes entities as a minimal ASCII DXF document (ENTITIES section only).
#[must_use]
pub fn write_dxf(entities: &[DxfEntity]) -> String {
    DxfDocument(entities).to_string()
}

struct DxfDocument<'a>(&'a [DxfEntity]);

impl fmt::Display for DxfDocument<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("0\nSECTION\n2\nENTITIES\n")?;
        for entity in self.0 {
            write!(f, "{entity}")?;
        }
        f.write_str("0\nENDSEC\n0\nEOF\n")
    }
}

/// Group-code form of one entity.
impl fmt::Display for DxfEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Polyline {
                layer,
                vertices,
                closed,
            } => {
                write!(
                    f,
                    "0\nLWPOLYLINE\n8\n{layer}\n90\n{}\n70\n{}\n",
                    vertices.len(),
                    u8::from(*closed)
                )?;
                for v in vertices {
                    write!(f, "10\n{}\n20\n{}\n", v.point.x, v.point.y)?;
                    if v.bulge != 0.0 {
                        write!(f, "42\n{}\n", v.bulge)?;
                    }
                }
                Ok(())
            }
            Self::Spline {
                layer,
                degree,
                control_points,
                knots,
            } => {
                // Flag 8: planar.
                write!(
                    f,
                    "0\nSPLINE\n8\n{layer}\n70\n8\n71\n{degree}\n72\n{}\n73\n{}\n74\n0\n",
                    knots.len(),
                    control_points.len()
                )?;
                for k in knots {
                    write!(f, "40\n{k}\n")?;
                }
                for p in control_points {
                    write!(f, "10\n{}\n20\n{}\n30\n0\n", p.x, p.y)?;
                }
                Ok(())
            }
        }
    }
}
