#![no_main]

use libfuzzer_sys::fuzz_target;
use pdbscope::{PdbConfig, PdbFile, PdbModule};

fuzz_target!(|data: &[u8]| {
    let Ok(pdb) = PdbFile::from_mem_with_config(data.to_vec(), PdbConfig::permissive()) else {
        return;
    };

    let _ = pdb.info();
    let _ = pdb.names();
    if let Ok(dbi) = pdb.dbi() {
        let _ = dbi.modules();
        let _ = dbi.section_contributions();
        let _ = dbi.section_map();
    }
    let _ = pdb.symbols();

    if let Ok(module) = PdbModule::from_pdb(pdb) {
        if let Ok(types) = module.get_all_types() {
            for symbol in types {
                let _ = symbol.fields(&module);
                let _ = symbol.base_classes(&module);
            }
        }
        for array_index in 0..module.type_count() {
            let _ = module.get_defined_symbol(array_index);
        }
    }
});
