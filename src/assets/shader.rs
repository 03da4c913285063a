//! Shader objects, programs and vertex attribute descriptions.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShaderType {
    Vertex,
    Fragment,
    Geometry,
}

/// Locations of the built-in attributes and uniforms of a shader program.
/// A location of `-1` means the program does not use it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderBlock {
    pub position_loc: i32,
    pub texcoord_loc: i32,
    pub color_loc: i32,
    pub model_view_projection_loc: i32,
}

impl Default for ShaderBlock {
    fn default() -> Self {
        ShaderBlock {
            position_loc: -1,
            texcoord_loc: -1,
            color_loc: -1,
            model_view_projection_loc: -1,
        }
    }
}

/// Names of the built-in variables used to fill a `ShaderBlock`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderBlockNames<'a> {
    pub position: Option<&'a str>,
    pub texcoord: Option<&'a str>,
    pub color: Option<&'a str>,
    pub model_view_matrix: Option<&'a str>,
}

impl<'a> Default for ShaderBlockNames<'a> {
    fn default() -> Self {
        ShaderBlockNames {
            position: Some("gpu_Vertex"),
            texcoord: Some("gpu_TexCoord"),
            color: Some("gpu_Color"),
            model_view_matrix: Some("gpu_ModelViewProjectionMatrix"),
        }
    }
}

/// Component type of a vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeEnum {
    Byte,
    UnsignedByte,
    Short,
    UnsignedShort,
    Int,
    UnsignedInt,
    Float,
    Double,
}

impl TypeEnum {
    pub fn size(self) -> usize {
        match self {
            TypeEnum::Byte | TypeEnum::UnsignedByte => 1,
            TypeEnum::Short | TypeEnum::UnsignedShort => 2,
            TypeEnum::Int | TypeEnum::UnsignedInt | TypeEnum::Float => 4,
            TypeEnum::Double => 8,
        }
    }
}

/// Memory layout of an attribute source buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttributeFormat {
    /// Values are supplied once per sprite instead of once per vertex.
    pub is_per_sprite: bool,
    pub num_elems_per_value: u32,
    pub kind: TypeEnum,
    pub normalize: bool,
    pub stride_bytes: u32,
    pub offset_bytes: u32,
}

impl AttributeFormat {
    pub fn new(
        num_elems_per_value: u32,
        kind: TypeEnum,
        normalize: bool,
        stride_bytes: u32,
        offset_bytes: u32,
    ) -> Self {
        AttributeFormat {
            is_per_sprite: false,
            num_elems_per_value,
            kind,
            normalize,
            stride_bytes,
            offset_bytes,
        }
    }

    /// Size in bytes of a single value.
    #[inline]
    pub fn value_size(&self) -> usize {
        self.num_elems_per_value as usize * self.kind.size()
    }
}

/// A vertex attribute source: raw bytes plus the layout to read them with.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub location: i32,
    pub values: Vec<u8>,
    pub format: AttributeFormat,
}

impl Attribute {
    pub fn new(location: i32, values: Vec<u8>, format: AttributeFormat) -> Self {
        Attribute {
            location,
            values,
            format,
        }
    }

    /// Builds an attribute from typed values.
    pub fn from_values<T: bytemuck::Pod>(location: i32, values: &[T], format: AttributeFormat) -> Self {
        Attribute::new(location, bytemuck::cast_slice(values).to_vec(), format)
    }

    /// Number of complete values readable from the source.
    pub fn num_values(&self) -> usize {
        let size = self.format.value_size();
        if size == 0 {
            return 0;
        }

        let stride = if self.format.stride_bytes == 0 {
            size
        } else {
            self.format.stride_bytes as usize
        };

        let offset = self.format.offset_bytes as usize;
        if self.values.len() < offset + size {
            return 0;
        }

        (self.values.len() - offset - size) / stride + 1
    }
}
