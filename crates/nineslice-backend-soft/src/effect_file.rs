//! Effect file reader.
//!
//! Only the parts a CPU device needs are interpreted: top-level
//! `uniform <type> <name> [= <default>];` declarations and the presence of
//! at least one `technique`. Shader function bodies are skipped.
//!
//! Supported defaults:
//!
//! ```text
//! uniform bool   show_uvs = false;
//! uniform float  weight   = 0.5;
//! uniform float2 size     = {1.0, 1.0};
//! uniform float4 border   = float4(8.0, 8.0, 8.0, 8.0);
//! ```

use std::path::Path;

use nineslice_types::error::{NineSliceError, Result};

/// Declared type of a uniform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformType {
    Bool,
    Float,
    Float2,
    Float4,
    Float4x4,
    Texture2d,
}

impl UniformType {
    fn parse(token: &str) -> Option<Self> {
        match token {
            "bool" => Some(Self::Bool),
            "float" => Some(Self::Float),
            "float2" => Some(Self::Float2),
            "float4" => Some(Self::Float4),
            "float4x4" => Some(Self::Float4x4),
            "texture2d" => Some(Self::Texture2d),
            _ => None,
        }
    }

    /// Float components of a vector type; `None` for non-numeric types.
    fn components(self) -> Option<usize> {
        match self {
            Self::Float => Some(1),
            Self::Float2 => Some(2),
            Self::Float4 => Some(4),
            _ => None,
        }
    }

    /// Value a uniform holds before anything is written.
    pub fn zero(self) -> UniformValue {
        match self {
            Self::Bool => UniformValue::Bool(false),
            Self::Float => UniformValue::Float(0.0),
            Self::Float2 => UniformValue::Vec2([0.0; 2]),
            Self::Float4 => UniformValue::Vec4([0.0; 4]),
            Self::Float4x4 | Self::Texture2d => UniformValue::Opaque,
        }
    }
}

/// Current value of a uniform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Bool(bool),
    Float(f32),
    Vec2([f32; 2]),
    Vec4([f32; 4]),
    /// Matrices and textures, bound by the host rather than the filter.
    Opaque,
}

/// One `uniform` declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Uniform {
    pub name: String,
    pub ty: UniformType,
    pub default: Option<UniformValue>,
    /// 1-based source line.
    pub line: usize,
}

impl Uniform {
    pub fn initial_value(&self) -> UniformValue {
        self.default.unwrap_or_else(|| self.ty.zero())
    }
}

/// Parsed effect file.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectFile {
    uniforms: Vec<Uniform>,
    techniques: Vec<String>,
}

impl EffectFile {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            NineSliceError::ProgramLoad(format!("{}: {e}", path.display()))
        })?;
        Self::parse(&text).map_err(|e| match e {
            NineSliceError::ProgramLoad(msg) => {
                NineSliceError::ProgramLoad(format!("{}: {msg}", path.display()))
            }
            other => other,
        })
    }

    pub fn parse(text: &str) -> Result<Self> {
        let stripped = strip_comments(text);
        let mut uniforms: Vec<Uniform> = Vec::new();
        let mut techniques = Vec::new();
        let mut depth = 0usize;

        for (idx, raw) in stripped.lines().enumerate() {
            let line = raw.trim();
            let lineno = idx + 1;

            if depth == 0 {
                let mut tokens = line.split_whitespace();
                match tokens.next() {
                    Some("uniform") => {
                        let uniform = parse_uniform(line, lineno)?;
                        if uniforms.iter().any(|u| u.name == uniform.name) {
                            return Err(load_error(
                                lineno,
                                format!("duplicate uniform '{}'", uniform.name),
                            ));
                        }
                        uniforms.push(uniform);
                    }
                    Some("technique") => {
                        let name = tokens
                            .next()
                            .map(|t| t.trim_end_matches('{').to_string())
                            .unwrap_or_default();
                        techniques.push(name);
                    }
                    _ => {}
                }
            }

            for c in line.chars() {
                match c {
                    '{' => depth += 1,
                    '}' => depth = depth.saturating_sub(1),
                    _ => {}
                }
            }
        }

        if techniques.is_empty() {
            return Err(NineSliceError::ProgramLoad(
                "no technique declared".to_string(),
            ));
        }

        Ok(Self {
            uniforms,
            techniques,
        })
    }

    pub fn uniforms(&self) -> &[Uniform] {
        &self.uniforms
    }

    pub fn techniques(&self) -> &[String] {
        &self.techniques
    }

    /// Index and declaration of the named uniform.
    pub fn uniform(&self, name: &str) -> Option<(usize, &Uniform)> {
        self.uniforms
            .iter()
            .enumerate()
            .find(|(_, u)| u.name == name)
    }
}

fn load_error(line: usize, msg: String) -> NineSliceError {
    NineSliceError::ProgramLoad(format!("line {line}: {msg}"))
}

/// Blank out `//` and `/* */` comments, keeping newlines so line numbers
/// still match the file.
fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut in_line = false;
    let mut in_block = false;

    while let Some(c) = chars.next() {
        if in_line {
            if c == '\n' {
                in_line = false;
                out.push('\n');
            }
            continue;
        }
        if in_block {
            if c == '*' && chars.peek() == Some(&'/') {
                chars.next();
                in_block = false;
                out.push(' ');
            } else if c == '\n' {
                out.push('\n');
            }
            continue;
        }
        if c == '/' {
            match chars.peek() {
                Some('/') => {
                    chars.next();
                    in_line = true;
                    continue;
                }
                Some('*') => {
                    chars.next();
                    in_block = true;
                    continue;
                }
                _ => {}
            }
        }
        out.push(c);
    }
    out
}

fn parse_uniform(line: &str, lineno: usize) -> Result<Uniform> {
    let Some(body) = line.strip_suffix(';') else {
        return Err(load_error(lineno, "uniform declaration missing ';'".into()));
    };
    let body = body.trim_start_matches("uniform").trim();

    let (decl, default) = match body.split_once('=') {
        Some((decl, default)) => (decl.trim(), Some(default.trim())),
        None => (body, None),
    };

    let mut parts = decl.split_whitespace();
    let (Some(ty_token), Some(name), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(load_error(
            lineno,
            format!("expected 'uniform <type> <name>', got '{decl}'"),
        ));
    };

    let ty = UniformType::parse(ty_token)
        .ok_or_else(|| load_error(lineno, format!("unknown uniform type '{ty_token}'")))?;

    if !is_identifier(name) {
        return Err(load_error(lineno, format!("invalid uniform name '{name}'")));
    }

    let default = default
        .map(|text| parse_default(ty, text).map_err(|msg| load_error(lineno, msg)))
        .transpose()?;

    Ok(Uniform {
        name: name.to_string(),
        ty,
        default,
        line: lineno,
    })
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn parse_default(ty: UniformType, text: &str) -> std::result::Result<UniformValue, String> {
    if ty == UniformType::Bool {
        return match text {
            "true" => Ok(UniformValue::Bool(true)),
            "false" => Ok(UniformValue::Bool(false)),
            _ => Err(format!("invalid bool default '{text}'")),
        };
    }

    let Some(count) = ty.components() else {
        return Err(format!("{ty:?} uniforms cannot have a default"));
    };

    let inner = if let Some(rest) = text.strip_prefix('{') {
        rest.strip_suffix('}')
    } else if let Some(open) = text.find('(') {
        text[open + 1..].strip_suffix(')')
    } else {
        Some(text)
    };
    let inner = inner.ok_or_else(|| format!("unbalanced default '{text}'"))?;

    let values = inner
        .split(',')
        .map(|v| {
            let v = v.trim();
            v.trim_end_matches('f')
                .parse::<f32>()
                .map_err(|_| format!("invalid number '{v}'"))
        })
        .collect::<std::result::Result<Vec<f32>, String>>()?;

    if values.len() != count {
        return Err(format!(
            "expected {count} components for {ty:?}, got {}",
            values.len()
        ));
    }

    Ok(match count {
        1 => UniformValue::Float(values[0]),
        2 => UniformValue::Vec2([values[0], values[1]]),
        _ => UniformValue::Vec4([values[0], values[1], values[2], values[3]]),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = "technique Draw\n{\n\tpass {}\n}\n";

    #[test]
    fn shipped_effect_declares_all_slots() {
        let fx = EffectFile::parse(include_str!("../../../data/sliced.effect")).unwrap();
        assert_eq!(fx.techniques(), ["Draw"]);
        for (name, ty) in [
            ("border", UniformType::Float4),
            ("source_size", UniformType::Float2),
            ("output_size", UniformType::Float2),
            ("show_uvs", UniformType::Bool),
            ("use_linear_filtering", UniformType::Bool),
        ] {
            let (_, u) = fx.uniform(name).unwrap();
            assert_eq!(u.ty, ty, "{name}");
        }
        let (_, border) = fx.uniform("border").unwrap();
        assert_eq!(border.default, Some(UniformValue::Vec4([8.0; 4])));
    }

    #[test]
    fn defaults_and_zero_values() {
        let src = format!(
            "uniform bool flag = true;\n\
             uniform float w = 0.5f;\n\
             uniform float2 size = float2(3, 4);\n\
             uniform float2 unset;\n\
             uniform texture2d image;\n{MINIMAL}"
        );
        let fx = EffectFile::parse(&src).unwrap();
        let values: Vec<UniformValue> = fx.uniforms().iter().map(Uniform::initial_value).collect();
        assert_eq!(
            values,
            [
                UniformValue::Bool(true),
                UniformValue::Float(0.5),
                UniformValue::Vec2([3.0, 4.0]),
                UniformValue::Vec2([0.0, 0.0]),
                UniformValue::Opaque,
            ]
        );
    }

    #[test]
    fn comments_are_ignored() {
        let src = format!(
            "// uniform float commented;\n\
             /* uniform float\n  also_commented; */\n\
             uniform float kept; // trailing\n{MINIMAL}"
        );
        let fx = EffectFile::parse(&src).unwrap();
        assert_eq!(fx.uniforms().len(), 1);
        assert_eq!(fx.uniforms()[0].name, "kept");
        assert_eq!(fx.uniforms()[0].line, 4);
    }

    #[test]
    fn locals_inside_functions_are_not_uniforms() {
        let src = format!("float f()\n{{\n\tuniform float inner;\n\treturn 1.0;\n}}\n{MINIMAL}");
        let fx = EffectFile::parse(&src).unwrap();
        assert!(fx.uniforms().is_empty());
    }

    #[test]
    fn missing_technique_is_error() {
        let err = EffectFile::parse("uniform float a;\n").unwrap_err();
        assert!(err.to_string().contains("no technique"));
    }

    #[test]
    fn errors_carry_line_numbers() {
        let cases = [
            ("\nuniform float a\n", "line 2"),
            ("uniform half a;\n", "unknown uniform type 'half'"),
            ("uniform float2 a = {1.0};\n", "expected 2 components"),
            ("uniform bool a = maybe;\n", "invalid bool default"),
            ("uniform float a;\nuniform float a;\n", "duplicate uniform 'a'"),
            ("uniform float 2a;\n", "invalid uniform name"),
        ];
        for (src, needle) in cases {
            let err = EffectFile::parse(&format!("{src}{MINIMAL}")).unwrap_err();
            assert!(
                err.to_string().contains(needle),
                "{src:?}: {err} lacks {needle:?}"
            );
        }
    }

    #[test]
    fn load_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.effect");
        let err = EffectFile::load(&path).unwrap_err();
        assert!(matches!(err, NineSliceError::ProgramLoad(_)));
        assert!(err.to_string().contains("missing.effect"));
    }
}
