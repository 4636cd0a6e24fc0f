pub mod python_lowering;
