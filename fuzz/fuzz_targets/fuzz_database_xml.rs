#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Malformed documents must fail with an error, never panic
    let Ok(xml) = std::str::from_utf8(data) else {
        return;
    };

    let Ok(db) = cadscene::database::parse_database_xml(xml) else {
        return;
    };

    let mut translator = cadscene::Translator::new(db, cadscene::TranslatorConfig::default());
    if translator.init().is_ok() {
        let root = cadscene::NodeRef::group("root");
        let _ = translator.translate("", &root);
    }
});
