/// Parser for the minimal text triangle-mesh format.
///
/// One statement per line:
///
/// ```text
/// v <x> <y> <z>      vertex, numbered from 1 in file order
/// f <a> <b> <c>      triangle over three previously declared vertices
/// ```
///
/// Every other line (comments, `vt`, `vn`, groups, materials, ...) is
/// ignored. Face tokens such as `3/7/2` are accepted and only the position
/// index is used.

use std::fs;
use std::path::Path;

use nom::{
    bytes::complete::take_till,
    character::complete::{char, i64 as integer, space0, space1},
    combinator::{all_consuming, opt},
    number::complete::float,
    sequence::{pair, preceded, terminated},
    IResult,
};
use tracing::{debug, info, warn};

use crate::error::MeshError;
use crate::geometry::{Mesh, Triangle};
use crate::math::Vec3;

/// Read and parse a mesh file.
pub fn load_mesh(path: impl AsRef<Path>) -> Result<Mesh, MeshError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| MeshError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mesh = parse_mesh(&text)?;
    info!(path = %path.display(), triangles = mesh.len(), "loaded mesh");
    Ok(mesh)
}

/// Like [`load_mesh`], but a missing, unreadable or malformed file yields an
/// empty mesh after logging the reason.
pub fn load_mesh_or_empty(path: impl AsRef<Path>) -> Mesh {
    let path = path.as_ref();
    match load_mesh(path) {
        Ok(mesh) => mesh,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "mesh unavailable, using empty mesh");
            Mesh::new()
        }
    }
}

/// Parse mesh text into model-space triangles.
pub fn parse_mesh(input: &str) -> Result<Mesh, MeshError> {
    let mut vertices: Vec<Vec3> = Vec::new();
    let mut mesh = Mesh::new();

    for (i, raw) in input.lines().enumerate() {
        let line_no = i + 1;
        let line = raw.trim();

        match keyword(line) {
            "v" => {
                let (x, y, z) = finish(line_no, vertex_statement(line))?;
                vertices.push(Vec3::new(x, y, z));
            }
            "f" => {
                let (a, b, c) = finish(line_no, face_statement(line))?;
                let p1 = lookup(&vertices, a, line_no)?;
                let p2 = lookup(&vertices, b, line_no)?;
                let p3 = lookup(&vertices, c, line_no)?;
                mesh.add_triangle(Triangle::from_positions(p1, p2, p3));
            }
            _ => {}
        }
    }

    debug!(vertices = vertices.len(), triangles = mesh.len(), "parsed mesh");
    Ok(mesh)
}

fn keyword(line: &str) -> &str {
    let token: IResult<&str, &str> = take_till(|c: char| c.is_whitespace())(line);
    token.map(|(_, word)| word).unwrap_or("")
}

fn finish<T>(line: usize, result: IResult<&str, T>) -> Result<T, MeshError> {
    result.map(|(_, value)| value).map_err(|e| MeshError::Parse {
        line,
        reason: match e {
            nom::Err::Error(e) | nom::Err::Failure(e) => {
                format!("malformed statement near {:?}", e.input)
            }
            nom::Err::Incomplete(_) => "incomplete statement".to_string(),
        },
    })
}

fn lookup(vertices: &[Vec3], index: i64, line: usize) -> Result<Vec3, MeshError> {
    let out_of_range = || MeshError::IndexOutOfRange {
        line,
        index,
        vertices: vertices.len(),
    };
    let slot = usize::try_from(index)
        .ok()
        .and_then(|i| i.checked_sub(1))
        .ok_or_else(out_of_range)?;
    vertices.get(slot).copied().ok_or_else(out_of_range)
}

fn vertex_statement(input: &str) -> IResult<&str, (f32, f32, f32)> {
    all_consuming(terminated(
        preceded(pair(char('v'), space1), parse_vector3),
        space0,
    ))(input)
}

fn face_statement(input: &str) -> IResult<&str, (i64, i64, i64)> {
    all_consuming(terminated(
        preceded(pair(char('f'), space1), parse_face_indices),
        space0,
    ))(input)
}

/// `x y z` with an optional trailing `w`. The weight only matters for
/// rational curves, so it is read and dropped.
fn parse_vector3(input: &str) -> IResult<&str, (f32, f32, f32)> {
    let (input, x) = float(input)?;
    let (input, _) = space1(input)?;
    let (input, y) = float(input)?;
    let (input, _) = space1(input)?;
    let (input, z) = float(input)?;
    let (input, _w) = opt(preceded(space1, float))(input)?;
    Ok((input, (x, y, z)))
}

fn parse_face_indices(input: &str) -> IResult<&str, (i64, i64, i64)> {
    let (input, a) = parse_face_index(input)?;
    let (input, _) = space1(input)?;
    let (input, b) = parse_face_index(input)?;
    let (input, _) = space1(input)?;
    let (input, c) = parse_face_index(input)?;
    Ok((input, (a, b, c)))
}

/// Position index of a face token, dropping any `/uv/normal` suffix.
fn parse_face_index(input: &str) -> IResult<&str, i64> {
    terminated(
        integer,
        opt(pair(char('/'), take_till(|c: char| c.is_whitespace()))),
    )(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::point;

    #[test]
    fn test_single_triangle() {
        let mesh = parse_mesh("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
        assert_eq!(mesh.len(), 1);
        let t = &mesh.triangles[0];
        assert_eq!(t.points[0], point(0.0, 0.0, 0.0));
        assert_eq!(t.points[1], point(1.0, 0.0, 0.0));
        assert_eq!(t.points[2], point(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_ignores_other_statements() {
        let text = "# exported\no chess\nvt 0.5 0.5\nvn 0 1 0\nv -1.5 2e-1 3\nv 1 0 0\n\
                    v 0 1 0\nusemtl board\ns off\nf 1/1/1 2/1/1 3/1/1\n";
        let mesh = parse_mesh(text).unwrap();
        assert_eq!(mesh.len(), 1);
        assert_eq!(mesh.triangles[0].points[0], point(-1.5, 0.2, 3.0));
    }

    #[test]
    fn test_handles_crlf_and_tabs() {
        let mesh = parse_mesh("v\t0 0 0\r\nv 1 0 0\r\nv 0 1 0\r\nf 3 2 1\r\n").unwrap();
        assert_eq!(mesh.len(), 1);
        assert_eq!(mesh.triangles[0].points[0], point(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_vertex_weight_is_accepted() {
        let mesh = parse_mesh("v 0 0 0 1.0\nv 1 0 0 0.5\nv 0 1 0\nf 1 2 3\n").unwrap();
        assert_eq!(mesh.len(), 1);
        assert_eq!(mesh.triangles[0].points[1], point(1.0, 0.0, 0.0));
        assert!(matches!(
            parse_mesh("v 0 0 0 1 2\n"),
            Err(MeshError::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn test_long_lines_are_fine() {
        let pad = " ".repeat(4096);
        let text = format!("v 0 0 0{pad}\nv 1 0 0\nv 0 1 0\nf 1 2 3{pad}\n");
        assert_eq!(parse_mesh(&text).unwrap().len(), 1);
    }

    #[test]
    fn test_out_of_range_index_is_an_error() {
        let err = parse_mesh("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 4\n").unwrap_err();
        match err {
            MeshError::IndexOutOfRange {
                line,
                index,
                vertices,
            } => {
                assert_eq!(line, 4);
                assert_eq!(index, 4);
                assert_eq!(vertices, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_zero_and_negative_indices_are_errors() {
        assert!(matches!(
            parse_mesh("v 0 0 0\nf 0 1 1\n"),
            Err(MeshError::IndexOutOfRange { index: 0, .. })
        ));
        assert!(matches!(
            parse_mesh("v 0 0 0\nf -1 1 1\n"),
            Err(MeshError::IndexOutOfRange { index: -1, .. })
        ));
    }

    #[test]
    fn test_face_before_vertices_is_an_error() {
        assert!(matches!(
            parse_mesh("f 1 2 3\nv 0 0 0\nv 1 0 0\nv 0 1 0\n"),
            Err(MeshError::IndexOutOfRange { line: 1, .. })
        ));
    }

    #[test]
    fn test_malformed_statements_report_line() {
        assert!(matches!(
            parse_mesh("v 0 0 0\nv 1 zero 0\n"),
            Err(MeshError::Parse { line: 2, .. })
        ));
        assert!(matches!(
            parse_mesh("v 0 0 0\nv 1 0 0\nv 0 1 0\nv 1 1 0\nf 1 2 3 4\n"),
            Err(MeshError::Parse { line: 5, .. })
        ));
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_mesh("").unwrap().is_empty());
    }

    #[test]
    fn test_missing_file() {
        let path = std::env::temp_dir().join("sr3d-definitely-missing.obj");
        assert!(matches!(load_mesh(&path), Err(MeshError::Io { .. })));
        assert!(load_mesh_or_empty(&path).is_empty());
    }
}
