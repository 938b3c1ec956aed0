// Instrument drivers built on the SCPI layer. Each one owns a ScpiSession over any Transport, so
// the same driver runs against a real VXI-11 link or a scripted mock

pub mod infiniium;
