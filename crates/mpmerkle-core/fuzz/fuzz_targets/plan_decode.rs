#![no_main]
use ciborium::de::from_reader;
use libfuzzer_sys::fuzz_target;
use mpmerkle_core::{io::Versioned, Plan};

fuzz_target!(|data: &[u8]| {
    if let Ok(v) = from_reader::<Versioned<Plan>, _>(data) {
        // Queries on an arbitrary decoded plan must not panic.
        let plan = v.payload;
        let _ = plan.total_units();
        let _ = plan.chunk_for_unit(0);
        let _ = plan.to_string();
    }
});
