#![no_main]
use libfuzzer_sys::fuzz_target;
use qprintf_core::stdio::{SliceSink, TruncatingSink};
use qprintf_core::{Arg, ArgList, format};

fuzz_target!(|data: &[u8]| {
    // Layout: [buffer size][split][format bytes | argument bytes]
    if data.len() < 2 {
        return;
    }
    let size = usize::from(data[0]);
    let split = usize::from(data[1]).min(data.len() - 2);
    let (fmt, raw) = data[2..].split_at(split);

    // Derive arguments of every class from the tail.
    let mut args = Vec::new();
    for chunk in raw.chunks(8) {
        let mut word = [0u8; 8];
        word[..chunk.len()].copy_from_slice(chunk);
        let bits = u64::from_le_bytes(word);
        args.push(match chunk[0] % 4 {
            0 => Arg::Int(bits as i32),
            1 => Arg::Char(chunk[0]),
            2 => Arg::Double(f64::from_bits(bits)),
            _ => Arg::Str(chunk),
        });
    }

    let mut buf = vec![0u8; size];
    let mut sink = SliceSink::new(&mut buf);
    let result = format(fmt, ArgList::new(&args), &mut sink);
    let written = sink.written();
    assert!(written <= size);
    if let Ok(count) = result {
        assert!(count <= written);
    }

    // Truncation never writes past the buffer and always counts everything.
    let mut buf = vec![0u8; size];
    let mut sink = TruncatingSink::new(&mut buf);
    if format(fmt, ArgList::new(&args), &mut sink).is_ok() {
        assert!(sink.stored() <= size.saturating_sub(1));
    }
});
