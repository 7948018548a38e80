//! XML loader for [`CadDatabase`]
//!
//! Everything lives in attributes; element text is ignored. Number lists are
//! whitespace separated. Instances name their original through `of`, which
//! must match the `id` of an assembly or part anywhere in the document.

use std::borrow::Cow;
use std::collections::HashMap;

use glam::{Mat4, Vec2, Vec3, Vec4};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::{CadDatabase, EntityId};
use crate::error::{Error, Result};
use crate::material::Material;
use crate::traverser::{ShapeSet, ShapeType};

/// Element currently open in the document
#[derive(Debug, Clone, Copy)]
enum Open {
    Database,
    Assembly(EntityId),
    Part(EntityId),
    Lod(EntityId, usize),
    Shape(EntityId, usize, usize),
    Instance(EntityId),
    Other,
    Leaf,
}

/// Parse a database document
#[doc(hidden)]
pub fn parse_database_xml(xml: &str) -> Result<CadDatabase> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut db = CadDatabase::new();
    let mut open: Vec<Open> = Vec::new();
    let mut ids: HashMap<String, EntityId> = HashMap::new();
    let mut references: Vec<(EntityId, String)> = Vec::new();
    let mut seen_root = false;
    let mut buf = Vec::new();

    loop {
        let event = reader.read_event_into(&mut buf)?;
        let is_empty = matches!(event, Event::Empty(_));

        match event {
            Event::Decl(_) | Event::Comment(_) => {}
            Event::DocType(_) => {
                return Err(Error::InvalidXml(
                    "DTD declarations are not allowed in database documents".to_string(),
                ));
            }
            Event::Start(ref e) | Event::Empty(ref e) => {
                let name = element_name(e)?;
                let attrs = parse_attributes(e)?;

                let context = match (name.as_str(), open.last().copied()) {
                    ("database", None) if !seen_root => {
                        seen_root = true;
                        Open::Database
                    }
                    ("database", _) => {
                        return Err(Error::invalid_xml_element("database", "must be the single root element"));
                    }
                    (_, None) => {
                        return Err(Error::InvalidXml(format!(
                            "Root element must be <database>, found <{}>",
                            name
                        )));
                    }
                    ("assembly", Some(parent)) => {
                        let id = db.add_assembly(entity_parent(&name, parent)?, text(&attrs, "name"))?;
                        apply_entity_attributes(&mut db, id, &attrs, &mut ids)?;
                        Open::Assembly(id)
                    }
                    ("part", Some(parent)) => {
                        let id = db.add_part(entity_parent(&name, parent)?, text(&attrs, "name"))?;
                        apply_entity_attributes(&mut db, id, &attrs, &mut ids)?;
                        Open::Part(id)
                    }
                    ("instance", Some(parent)) => {
                        let id = db.add_instance(entity_parent(&name, parent)?, text(&attrs, "name"), None)?;
                        if attrs.contains_key("id") {
                            return Err(Error::invalid_xml_element("instance", "instances cannot carry an 'id'"));
                        }
                        apply_entity_attributes(&mut db, id, &attrs, &mut ids)?;
                        if let Some(key) = attrs.get("of") {
                            references.push((id, key.clone()));
                        }
                        Open::Instance(id)
                    }
                    ("other", Some(parent)) => {
                        db.add_other(entity_parent(&name, parent)?, text(&attrs, "name"))?;
                        Open::Other
                    }
                    ("lod", Some(Open::Part(part))) => Open::Lod(part, db.add_lod(part)?),
                    ("shape", Some(Open::Lod(part, lod))) => {
                        let shape_type = parse_shape_type(&attrs)?;
                        Open::Shape(part, lod, db.add_shape(part, lod, shape_type)?)
                    }
                    ("set", Some(Open::Shape(part, lod, shape))) => {
                        db.add_shape_set(part, lod, shape, parse_set(&attrs)?)?;
                        Open::Leaf
                    }
                    ("material", Some(parent)) => {
                        let material = parse_material(&attrs)?;
                        match parent {
                            Open::Assembly(id) | Open::Part(id) | Open::Instance(id) => {
                                db.set_material(id, material)?;
                            }
                            Open::Shape(part, lod, shape) => {
                                db.set_shape_material(part, lod, shape, material)?;
                            }
                            _ => {
                                return Err(Error::invalid_xml_element(
                                    "material",
                                    "must be a child of <assembly>, <part>, <instance> or <shape>",
                                ));
                            }
                        }
                        Open::Leaf
                    }
                    ("lod", _) => return Err(Error::invalid_xml_element("lod", "must be a child of <part>")),
                    ("shape", _) => return Err(Error::invalid_xml_element("shape", "must be a child of <lod>")),
                    ("set", _) => return Err(Error::invalid_xml_element("set", "must be a child of <shape>")),
                    (other, _) => return Err(Error::invalid_xml_element(other, "unknown element")),
                };

                if !is_empty {
                    open.push(context);
                }
            }
            Event::End(_) => {
                open.pop();
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !seen_root {
        return Err(Error::InvalidXml("Missing <database> root element".to_string()));
    }

    for (instance, key) in references {
        let original = ids.get(&key).copied().ok_or_else(|| {
            Error::InvalidDatabase(format!(
                "Instance '{}' refers to unknown id '{}'",
                db.entities[instance.index()].name, key
            ))
        })?;
        db.set_original(instance, Some(original))?;
    }

    Ok(db)
}

fn element_name(e: &BytesStart) -> Result<String> {
    let name = e.name();
    let name = std::str::from_utf8(name.as_ref()).map_err(|e| Error::InvalidXml(e.to_string()))?;
    Ok(name.to_string())
}

fn parse_attributes(e: &BytesStart) -> Result<HashMap<String, String>> {
    let mut attrs = HashMap::with_capacity(8);

    for attr in e.attributes() {
        let attr = attr?;
        let key = std::str::from_utf8(attr.key.as_ref()).map_err(|e| Error::InvalidXml(e.to_string()))?;
        let raw = std::str::from_utf8(&attr.value).map_err(|e| Error::InvalidXml(e.to_string()))?;
        let value: Cow<'_, str> =
            quick_xml::escape::unescape(raw).map_err(|e| Error::XmlAttr(format!("{}: {}", key, e)))?;

        if attrs.insert(key.to_string(), value.into_owned()).is_some() {
            return Err(Error::XmlAttr(format!("Duplicate attribute '{}'", key)));
        }
    }

    Ok(attrs)
}

fn text(attrs: &HashMap<String, String>, key: &str) -> String {
    attrs.get(key).cloned().unwrap_or_default()
}

fn entity_parent(element: &str, parent: Open) -> Result<Option<EntityId>> {
    match parent {
        Open::Database => Ok(None),
        Open::Assembly(id) => Ok(Some(id)),
        _ => Err(Error::invalid_xml_element(
            element,
            "must be a child of <database> or <assembly>",
        )),
    }
}

fn apply_entity_attributes(
    db: &mut CadDatabase,
    id: EntityId,
    attrs: &HashMap<String, String>,
    ids: &mut HashMap<String, EntityId>,
) -> Result<()> {
    if let Some(value) = attrs.get("transform") {
        db.set_transform(id, parse_transform(value)?)?;
    }

    if let Some(key) = attrs.get("id") {
        if ids.insert(key.clone(), id).is_some() {
            return Err(Error::InvalidDatabase(format!("Duplicate id '{}'", key)));
        }
    }

    Ok(())
}

fn parse_floats(field: &str, value: &str) -> Result<Vec<f32>> {
    value
        .split_whitespace()
        .map(|token| {
            token
                .parse::<f32>()
                .map_err(|_| Error::parse_error_with_context(field, token, "floating-point number"))
        })
        .collect()
}

fn parse_tuples<const N: usize>(field: &str, value: &str) -> Result<Vec<[f32; N]>> {
    let floats = parse_floats(field, value)?;
    if floats.len() % N != 0 {
        return Err(Error::ParseError(format!(
            "'{}' holds {} numbers, not a multiple of {}",
            field,
            floats.len(),
            N
        )));
    }

    Ok(floats
        .chunks_exact(N)
        .map(|c| {
            let mut tuple = [0.0; N];
            tuple.copy_from_slice(c);
            tuple
        })
        .collect())
}

fn parse_vec3s(field: &str, value: &str) -> Result<Vec<Vec3>> {
    Ok(parse_tuples::<3>(field, value)?.into_iter().map(Vec3::from).collect())
}

/// 16 numbers, row major
fn parse_transform(value: &str) -> Result<Mat4> {
    let floats = parse_floats("transform", value)?;
    let rows: [f32; 16] = floats.as_slice().try_into().map_err(|_| {
        Error::ParseError(format!("'transform' needs 16 numbers, got {}", floats.len()))
    })?;
    Ok(Mat4::from_cols_array(&rows).transpose())
}

/// RGBA, or RGB with alpha one
fn parse_color(field: &str, value: &str) -> Result<Vec4> {
    match parse_floats(field, value)?.as_slice() {
        &[r, g, b] => Ok(Vec4::new(r, g, b, 1.0)),
        &[r, g, b, a] => Ok(Vec4::new(r, g, b, a)),
        other => Err(Error::ParseError(format!(
            "'{}' needs 3 or 4 numbers, got {}",
            field,
            other.len()
        ))),
    }
}

fn parse_material(attrs: &HashMap<String, String>) -> Result<Material> {
    let mut material = Material::new();
    for (key, value) in attrs {
        match key.as_str() {
            "ambient" => material.ambient = Some(parse_color(key, value)?),
            "diffuse" => material.diffuse = Some(parse_color(key, value)?),
            "specular" => material.specular = Some(parse_color(key, value)?),
            "emissive" => material.emissive = Some(parse_color(key, value)?),
            "shininess" => {
                let shininess = value
                    .trim()
                    .parse::<f32>()
                    .map_err(|_| Error::parse_error_with_context(key, value, "floating-point number"))?;
                material.shininess = Some(shininess);
            }
            other => {
                return Err(Error::invalid_xml_element(
                    "material",
                    &format!("unknown attribute '{}'", other),
                ));
            }
        }
    }
    Ok(material)
}

fn parse_shape_type(attrs: &HashMap<String, String>) -> Result<ShapeType> {
    let value = attrs
        .get("type")
        .ok_or_else(|| Error::missing_attribute("shape", "type"))?;

    if let Some(shape_type) = ShapeType::from_name(value) {
        return Ok(shape_type);
    }

    let id: u32 = value.parse()?;
    Ok(ShapeType::Unknown(id))
}

fn parse_set(attrs: &HashMap<String, String>) -> Result<ShapeSet> {
    let mut set = ShapeSet::default();
    for (key, value) in attrs {
        match key.as_str() {
            "vertices" => set.vertices = parse_vec3s(key, value)?,
            "normals" => set.normals = parse_vec3s(key, value)?,
            "colors" => set.colors = parse_vec3s(key, value)?,
            "texcoords" => {
                set.tex_coords = parse_tuples::<2>(key, value)?.into_iter().map(Vec2::from).collect();
            }
            other => {
                return Err(Error::invalid_xml_element("set", &format!("unknown attribute '{}'", other)));
            }
        }
    }
    Ok(set)
}
