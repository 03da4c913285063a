use std::fs;

use super::{non_nil, GpuSystem};

use crate::assets::prelude::*;
use crate::errors::*;

impl GpuSystem {
    /// Compiles a shader object from source. Returns its id.
    pub fn compile_shader(&mut self, kind: ShaderType, source: &str) -> Option<u32> {
        self.dispatch("compile_shader", |b| b.compile_shader(kind, source))
    }

    /// Compiles a shader object from the source file at `path`.
    pub fn load_shader(&mut self, kind: ShaderType, path: &str) -> Option<u32> {
        self.dispatch("load_shader", |b| {
            let source = fs::read_to_string(path).map_err(|err| match Error::from(err) {
                Error {
                    code: ErrorCode::FileNotFound,
                    ..
                } => Error::file_not_found(format!("Failed to open shader file \"{}\".", path)),
                other => other,
            })?;

            b.compile_shader(kind, &source)
        })
    }

    pub fn create_shader_program(&mut self) -> Option<u32> {
        self.dispatch("create_shader_program", |b| b.create_shader_program())
    }

    pub fn link_shader_program(&mut self, program: u32) -> bool {
        self.dispatch("link_shader_program", |b| b.link_shader_program(program))
            .is_some()
    }

    /// Links a vertex and a fragment shader into a new program. The program
    /// is freed if linking fails.
    pub fn link_shaders(&mut self, vertex_shader: u32, fragment_shader: u32) -> Option<u32> {
        self.dispatch("link_shaders", |b| {
            if !b.enabled_features().contains(Features::BASIC_SHADERS) {
                return Err(Error::unsupported(
                    "Basic shaders are not supported by the current renderer.",
                ));
            }

            let program = b.create_shader_program()?;
            let linked = b
                .attach_shader(program, vertex_shader)
                .and_then(|_| b.attach_shader(program, fragment_shader))
                .and_then(|_| b.link_shader_program(program));

            match linked {
                Ok(_) => Ok(program),
                Err(err) => {
                    b.free_shader_program(program)?;
                    Err(err)
                }
            }
        })
    }

    pub fn free_shader(&mut self, shader: u32) {
        self.dispatch("free_shader", |b| b.free_shader(shader));
    }

    pub fn free_shader_program(&mut self, program: u32) {
        self.dispatch("free_shader_program", |b| b.free_shader_program(program));
    }

    pub fn attach_shader(&mut self, program: u32, shader: u32) {
        self.dispatch("attach_shader", |b| b.attach_shader(program, shader));
    }

    pub fn detach_shader(&mut self, program: u32, shader: u32) {
        self.dispatch("detach_shader", |b| b.detach_shader(program, shader));
    }

    /// Returns true if `program` is one of the built-in programs of the
    /// current context.
    pub fn is_default_shader_program(&self, program: u32) -> bool {
        match self.current_context() {
            Some(ctx) => {
                program == ctx.default_textured_shader_program
                    || program == ctx.default_untextured_shader_program
            }
            None => false,
        }
    }

    /// Activates `program`, or the default program with `0`. Without a
    /// `block`, the built-in variables are looked up by their default names.
    pub fn activate_shader_program(&mut self, program: u32, block: Option<&ShaderBlock>) {
        self.dispatch("activate_shader_program", |b| {
            b.activate_shader_program(program, block)
        });
    }

    pub fn deactivate_shader_program(&mut self) {
        self.dispatch("deactivate_shader_program", |b| b.deactivate_shader_program());
    }

    /// The log of the last failed compilation or link.
    pub fn shader_message(&self) -> String {
        self.current_backend()
            .map(|v| v.shader_message())
            .unwrap_or_default()
    }

    /// The location of the attribute `name` of `program`, `-1` if there is
    /// none.
    pub fn attribute_location(&mut self, program: u32, name: &str) -> Option<i32> {
        self.dispatch("attribute_location", |b| b.attribute_location(program, name))
    }

    /// The location of the uniform `name` of `program`, `-1` if there is none.
    pub fn uniform_location(&mut self, program: u32, name: &str) -> Option<i32> {
        self.dispatch("uniform_location", |b| b.uniform_location(program, name))
    }

    pub fn load_shader_block(&mut self, program: u32, names: &ShaderBlockNames) -> Option<ShaderBlock> {
        self.dispatch("load_shader_block", |b| b.load_shader_block(program, names))
    }

    pub fn set_shader_block(&mut self, block: ShaderBlock) {
        self.dispatch("set_shader_block", |b| b.set_shader_block(block));
    }

    /// Binds `image` to the sampler at `location`, using texture unit
    /// `image_unit`. Unit `0` is reserved for the blitted image.
    pub fn set_shader_image(&mut self, image: ImageHandle, location: i32, image_unit: u32) {
        self.dispatch("set_shader_image", |b| {
            non_nil(image, "image")?;
            b.set_shader_image(image, location, image_unit)
        });
    }
}

impl GpuSystem {
    pub fn uniformiv(&mut self, program: u32, location: i32) -> Option<Vec<i32>> {
        self.dispatch("uniformiv", |b| b.uniformiv(program, location))
    }

    pub fn set_uniformi(&mut self, location: i32, value: i32) {
        self.dispatch("set_uniformi", |b| b.set_uniformi(location, value));
    }

    pub fn set_uniformiv(&mut self, location: i32, num_elements_per_value: u32, values: &[i32]) {
        self.dispatch("set_uniformiv", |b| {
            b.set_uniformiv(location, num_elements_per_value, values)
        });
    }

    pub fn uniformuiv(&mut self, program: u32, location: i32) -> Option<Vec<u32>> {
        self.dispatch("uniformuiv", |b| b.uniformuiv(program, location))
    }

    pub fn set_uniformui(&mut self, location: i32, value: u32) {
        self.dispatch("set_uniformui", |b| b.set_uniformui(location, value));
    }

    pub fn set_uniformuiv(&mut self, location: i32, num_elements_per_value: u32, values: &[u32]) {
        self.dispatch("set_uniformuiv", |b| {
            b.set_uniformuiv(location, num_elements_per_value, values)
        });
    }

    pub fn uniformfv(&mut self, program: u32, location: i32) -> Option<Vec<f32>> {
        self.dispatch("uniformfv", |b| b.uniformfv(program, location))
    }

    pub fn set_uniformf(&mut self, location: i32, value: f32) {
        self.dispatch("set_uniformf", |b| b.set_uniformf(location, value));
    }

    pub fn set_uniformfv(&mut self, location: i32, num_elements_per_value: u32, values: &[f32]) {
        self.dispatch("set_uniformfv", |b| {
            b.set_uniformfv(location, num_elements_per_value, values)
        });
    }

    /// The elements of the matrix uniform at `location`, column by column.
    pub fn uniform_matrixfv(&mut self, program: u32, location: i32) -> Option<Vec<f32>> {
        self.dispatch("uniform_matrixfv", |b| b.uniformfv(program, location))
    }

    /// Sets `num_matrices` matrices of `num_rows` by `num_columns` elements.
    pub fn set_uniform_matrixfv(
        &mut self,
        location: i32,
        num_matrices: u32,
        num_rows: u32,
        num_columns: u32,
        transpose: bool,
        values: &[f32],
    ) {
        self.dispatch("set_uniform_matrixfv", |b| {
            b.set_uniform_matrixfv(location, num_matrices, num_rows, num_columns, transpose, values)
        });
    }
}

impl GpuSystem {
    pub fn set_attributef(&mut self, location: i32, value: f32) {
        self.dispatch("set_attributef", |b| b.set_attributef(location, value));
    }

    pub fn set_attributei(&mut self, location: i32, value: i32) {
        self.dispatch("set_attributei", |b| b.set_attributei(location, value));
    }

    pub fn set_attributeui(&mut self, location: i32, value: u32) {
        self.dispatch("set_attributeui", |b| b.set_attributeui(location, value));
    }

    pub fn set_attributefv(&mut self, location: i32, values: &[f32]) {
        self.dispatch("set_attributefv", |b| b.set_attributefv(location, values));
    }

    pub fn set_attributeiv(&mut self, location: i32, values: &[i32]) {
        self.dispatch("set_attributeiv", |b| b.set_attributeiv(location, values));
    }

    pub fn set_attributeuiv(&mut self, location: i32, values: &[u32]) {
        self.dispatch("set_attributeuiv", |b| b.set_attributeuiv(location, values));
    }

    /// Feeds the attribute at `source.location` from `source` for the next
    /// `num_values` vertices.
    pub fn set_attribute_source(&mut self, num_values: usize, source: Attribute) {
        self.dispatch("set_attribute_source", |b| {
            b.set_attribute_source(num_values, source)
        });
    }
}
