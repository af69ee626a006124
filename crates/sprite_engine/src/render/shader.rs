//! Shader sources and their declared inputs

use std::collections::BTreeSet;

use super::RenderError;

/// Uniforms every sprite shader must declare
pub const REQUIRED_UNIFORMS: [&str; 4] = ["uTransformation", "uniColor", "uniColorMix", "uniSubTexPos"];

/// Vertex attributes every sprite shader must declare
pub const REQUIRED_ATTRIBUTES: [&str; 1] = ["iVert"];

/// Vertex and fragment GLSL source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSource {
    /// Vertex stage
    pub vertex: String,
    /// Fragment stage
    pub fragment: String,
}

/// A loaded shader with the identifiers it declares
#[derive(Debug, Clone)]
pub struct ShaderProgram {
    alias: String,
    source: ShaderSource,
    uniforms: BTreeSet<String>,
    attributes: BTreeSet<String>,
}

impl ShaderProgram {
    /// Scan both stages for `uniform` declarations and the vertex stage for
    /// `in`/`attribute` declarations
    pub fn parse(alias: impl Into<String>, source: ShaderSource) -> Self {
        let mut uniforms = declarations(&source.vertex, &["uniform"]);
        uniforms.extend(declarations(&source.fragment, &["uniform"]));
        let attributes = declarations(&source.vertex, &["in", "attribute"]);

        Self {
            alias: alias.into(),
            source,
            uniforms,
            attributes,
        }
    }

    /// Alias the shader was loaded under
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// GLSL source
    pub fn source(&self) -> &ShaderSource {
        &self.source
    }

    /// Whether `name` is declared as a uniform in either stage
    pub fn has_uniform(&self, name: &str) -> bool {
        self.uniforms.contains(name)
    }

    /// Whether `name` is declared as a vertex input
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains(name)
    }

    /// Declared uniforms, sorted
    pub fn uniforms(&self) -> impl Iterator<Item = &str> {
        self.uniforms.iter().map(String::as_str)
    }

    /// Declared vertex inputs, sorted
    pub fn attributes(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(String::as_str)
    }

    /// Check every input the sprite pipeline writes is declared
    pub fn validate(&self) -> Result<(), RenderError> {
        let missing_uniform = REQUIRED_UNIFORMS
            .iter()
            .find(|name| !self.has_uniform(name))
            .map(|name| ("uniform", *name));
        let missing_attribute = REQUIRED_ATTRIBUTES
            .iter()
            .find(|name| !self.has_attribute(name))
            .map(|name| ("attribute", *name));

        match missing_uniform.or(missing_attribute) {
            Some((kind, name)) => Err(RenderError::MissingShaderInput {
                shader: self.alias.clone(),
                kind,
                name: name.to_owned(),
            }),
            None => Ok(()),
        }
    }
}

fn declarations(source: &str, qualifiers: &[&str]) -> BTreeSet<String> {
    source
        .lines()
        .map(|line| line.split("//").next().unwrap_or_default())
        .flat_map(|line| line.split(';'))
        .filter_map(|statement| {
            let tokens: Vec<&str> = statement.split_whitespace().collect();
            let qualifier = tokens.iter().position(|t| qualifiers.contains(t))?;
            // qualifier, type, name at minimum
            if tokens.len() < qualifier + 3 {
                return None;
            }
            let name = tokens.last()?;
            let name = name.split('[').next().unwrap_or(name);
            Some(name.to_owned())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERT: &str = "#version 330 core
layout(location = 0) in vec2 iVert;
in vec2 iTexCoord; // uv
uniform mat3 uTransformation;
uniform vec4 uniSubTexPos;
out vec2 vTexCoord;
void main() { gl_Position = vec4(uTransformation * vec3(iVert, 1.0), 1.0); }
";

    const FRAG: &str = "#version 330 core
in vec2 vTexCoord;
uniform sampler2D uTexture;
uniform vec4 uniColor;
uniform float uniColorMix;
out vec4 fragColor;
";

    fn source(vertex: &str, fragment: &str) -> ShaderSource {
        ShaderSource {
            vertex: vertex.to_owned(),
            fragment: fragment.to_owned(),
        }
    }

    #[test]
    fn test_parse_collects_declarations() {
        let program = ShaderProgram::parse("shaders/sprite", source(VERT, FRAG));
        assert!(program.has_attribute("iVert"));
        assert!(program.has_attribute("iTexCoord"));
        assert!(!program.has_attribute("vTexCoord"));
        assert!(program.has_uniform("uTexture"));
        assert!(program.has_uniform("uniColorMix"));
        assert!(program.validate().is_ok());
    }

    #[test]
    fn test_missing_uniform_is_reported() {
        let fragment = FRAG.replace("uniform float uniColorMix;", "");
        let program = ShaderProgram::parse("shaders/flat", source(VERT, &fragment));
        assert_eq!(
            program.validate(),
            Err(RenderError::MissingShaderInput {
                shader: "shaders/flat".to_owned(),
                kind: "uniform",
                name: "uniColorMix".to_owned(),
            })
        );
    }

    #[test]
    fn test_commented_declarations_are_ignored() {
        let vertex = VERT.replace("layout(location = 0) in vec2 iVert;", "// in vec2 iVert;");
        let program = ShaderProgram::parse("shaders/sprite", source(&vertex, FRAG));
        assert!(!program.has_attribute("iVert"));
        assert!(matches!(
            program.validate(),
            Err(RenderError::MissingShaderInput { kind: "attribute", .. })
        ));
    }
}
