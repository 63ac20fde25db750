use nih_plug::prelude::*;
use phosphor::PhosphorPlugin;

fn main() {
    nih_export_standalone::<PhosphorPlugin>();
}
