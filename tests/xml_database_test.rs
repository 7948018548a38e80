//! Translating database documents loaded from disk

mod common;

use std::io::Write;

use cadscene::database::CadDatabase;
use cadscene::scene::{Binding, NodeRef};
use cadscene::{Error, Translator, TranslatorConfig};
use common::init_tracing;
use glam::{Mat4, Vec3, Vec4};
use tempfile::NamedTempFile;

const CAR: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!-- wheels are defined once and instanced -->
<database>
  <assembly name="car">
    <material diffuse="0.2 0.2 0.2"/>
    <assembly name="front axle" transform="1 0 0 0  0 1 0 0  0 0 1 2  0 0 0 1">
      <instance name="left wheel" of="wheel" transform="1 0 0 -1  0 1 0 0  0 0 1 0  0 0 0 1"/>
      <instance name="right wheel" of="wheel" transform="1 0 0 1  0 1 0 0  0 0 1 0  0 0 0 1"/>
    </assembly>
    <assembly name="spares">
      <part id="wheel" name="wheel">
        <material diffuse="0.1 0.1 0.1 1"/>
        <lod>
          <shape type="tri_strip">
            <set vertices="0 0 0  1 0 0  0 1 0  1 1 0" normals="0 0 1"/>
          </shape>
        </lod>
        <lod>
          <shape type="polygon">
            <set vertices="0 0 0  1 0 0  0 1 0"/>
          </shape>
        </lod>
      </part>
    </assembly>
    <part name="Body&#10;Shell">
      <lod>
        <shape type="polygon">
          <material diffuse="1 0 0 0.5"/>
          <set vertices="0 0 0  2 0 0  2 1 0  0 1 0" colors="1 0 0  0 1 0  0 0 1  1 1 1"/>
        </shape>
      </lod>
    </part>
  </assembly>
</database>"#;

fn write_document(xml: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(xml.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn translate_file(xml: &str) -> (cadscene::Result<()>, NodeRef) {
    init_tracing();
    let file = write_document(xml);
    let mut translator = Translator::new(CadDatabase::new(), TranslatorConfig::default());
    translator.init().unwrap();
    let root = NodeRef::group("root");
    let result = translator.translate(file.path(), &root);
    (result, root)
}

#[test]
fn test_translate_car_document() {
    let (result, root) = translate_file(CAR);
    result.unwrap();

    let car = root.child(0).unwrap();
    assert_eq!(car.name(), "car");
    assert_eq!(car.num_children(), 3);

    let axle = root.find("front axle").unwrap();
    assert_eq!(
        axle.read().matrix(),
        Some(Mat4::from_translation(Vec3::new(0.0, 0.0, 2.0)))
    );

    // Both wheels were referenced before the wheel part was read
    let wheel = root.find("wheel").unwrap();
    let left = root.find("left wheel").unwrap();
    let right = root.find("right wheel").unwrap();
    assert_eq!(left.num_children(), 2);
    for i in 0..2 {
        assert!(left.child(i).unwrap().ptr_eq(&wheel.child(i).unwrap()));
        assert!(right.child(i).unwrap().ptr_eq(&wheel.child(i).unwrap()));
    }
    assert_eq!(
        left.read().matrix(),
        Some(Mat4::from_translation(Vec3::new(-1.0, 0.0, 0.0)))
    );

    let lod0 = common::lod_geometry(&root, "wheel", 0);
    assert_eq!(lod0.primitive_lengths, vec![4]);
    assert_eq!(lod0.normals.unwrap().binding, Binding::PerPrimitive);
    // Part material beats the car's
    assert_eq!(
        lod0.state.material.unwrap().diffuse,
        Some(Vec4::new(0.1, 0.1, 0.1, 1.0))
    );

    let body = common::lod_geometry(&root, "Replaced_name_0", 0);
    assert!(body.state.transparency);
    let colors = body.colors.unwrap();
    assert_eq!(colors.binding, Binding::PerVertex);
    assert_eq!(colors.values[1], Vec4::new(0.0, 1.0, 0.0, 1.0));
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.xml");

    let mut translator = Translator::new(CadDatabase::new(), TranslatorConfig::default());
    translator.init().unwrap();
    let err = translator.translate(&missing, &NodeRef::group("root")).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
    assert!(translator.last_error().unwrap().contains("[E1001]"));
}

#[test]
fn test_malformed_document() {
    let (result, root) = translate_file("<database><assembly name=\"a\"></database>");
    assert!(matches!(result, Err(Error::Xml(_))));
    assert_eq!(root.num_children(), 0);
}

#[test]
fn test_dangling_reference() {
    let xml = r#"<database><instance name="ghost" of="missing"/></database>"#;
    let (result, _) = translate_file(xml);
    assert!(matches!(result, Err(Error::InvalidDatabase(_))));
}

#[test]
fn test_loaded_document_replaces_contents() {
    let file = write_document(r#"<database><part name="from disk"/></database>"#);

    let mut db = CadDatabase::new();
    db.add_part(None, "in memory").unwrap();

    let mut translator = Translator::new(db, TranslatorConfig::default());
    translator.init().unwrap();
    let root = NodeRef::group("root");
    translator.translate(file.path(), &root).unwrap();

    assert_eq!(root.num_children(), 1);
    assert_eq!(root.child(0).unwrap().name(), "from disk");
    assert_eq!(translator.traverser().len(), 1);
}
