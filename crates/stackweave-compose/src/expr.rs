//! Output value expressions parsed with `nom`.
//!
//! An expression is a template string where `${resource.attribute}`
//! interpolates a runtime attribute of a descriptor of the owning stack,
//! e.g. `ssh ec2-user@${api-server.publicDnsName}`. A `$` not followed by
//! `{` is literal text.

use std::fmt;
use std::str::FromStr;

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{is_not, tag, take_while1},
    character::complete::char,
    combinator::{not, opt},
    multi::many0,
    sequence::{delimited, pair, preceded, terminated},
};
use serde::Serialize;
use stackweave_common::error::{Result, StackweaveError};
use stackweave_common::types::ResourceId;

use crate::descriptor::ResourceRef;

/// One piece of an [`OutputExpr`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExprPart {
    /// Literal text.
    Literal(String),
    /// Runtime attribute of a descriptor, known only once provisioned.
    Attribute(ResourceRef),
}

/// A late-bound output value expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputExpr {
    parts: Vec<ExprPart>,
}

const fn is_resource_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

const fn is_attribute_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn interpolation(input: &str) -> IResult<&str, ExprPart> {
    let (input, (resource, attribute)) = delimited(
        tag("${"),
        pair(
            take_while1(is_resource_char),
            opt(preceded(char('.'), take_while1(is_attribute_char))),
        ),
        char('}'),
    )
    .parse(input)?;
    let reference = ResourceRef {
        resource: ResourceId::new(resource),
        attribute: attribute.map(str::to_owned),
    };
    Ok((input, ExprPart::Attribute(reference)))
}

fn literal(input: &str) -> IResult<&str, ExprPart> {
    let (input, text) = alt((is_not("$"), terminated(tag("$"), not(char('{'))))).parse(input)?;
    Ok((input, ExprPart::Literal(text.to_owned())))
}

impl OutputExpr {
    /// Parses an expression.
    ///
    /// # Errors
    ///
    /// Returns a validation error if an interpolation is malformed or
    /// left unterminated.
    pub fn parse(input: &str) -> Result<Self> {
        let (rest, raw) = many0(alt((interpolation, literal)))
            .parse(input)
            .map_err(|e| StackweaveError::validation("output expression", input, e.to_string()))?;
        if !rest.is_empty() {
            return Err(StackweaveError::validation(
                "output expression",
                input,
                format!("has a malformed interpolation at \"{rest}\""),
            ));
        }

        let mut parts: Vec<ExprPart> = Vec::with_capacity(raw.len());
        for part in raw {
            match (parts.last_mut(), part) {
                (Some(ExprPart::Literal(prev)), ExprPart::Literal(next)) => prev.push_str(&next),
                (_, part) => parts.push(part),
            }
        }
        Ok(Self { parts })
    }

    /// Parts in order.
    pub fn parts(&self) -> &[ExprPart] {
        &self.parts
    }

    /// Every descriptor reference in the expression.
    pub fn references(&self) -> impl Iterator<Item = &ResourceRef> {
        self.parts.iter().filter_map(|p| match p {
            ExprPart::Attribute(r) => Some(r),
            ExprPart::Literal(_) => None,
        })
    }

    /// Renders the expression, substituting every attribute with `lookup`.
    pub fn render(&self, mut lookup: impl FnMut(&ResourceRef) -> String) -> String {
        self.parts
            .iter()
            .map(|p| match p {
                ExprPart::Literal(text) => text.clone(),
                ExprPart::Attribute(r) => lookup(r),
            })
            .collect()
    }
}

impl FromStr for OutputExpr {
    type Err = StackweaveError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for OutputExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for part in &self.parts {
            match part {
                ExprPart::Literal(text) => write!(f, "{text}")?,
                ExprPart::Attribute(r) => write!(f, "${{{r}}}")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_command_with_attribute() {
        let expr =
            OutputExpr::parse("aws ssm start-session --target ${api-server.instanceId}")
                .expect("should parse");
        assert_eq!(expr.parts().len(), 2);
        let refs: Vec<_> = expr.references().collect();
        assert_eq!(refs, vec![&ResourceRef::attr("api-server", "instanceId")]);
    }

    #[test]
    fn bare_resource_reference_has_no_attribute() {
        let expr = OutputExpr::parse("${lake}").expect("should parse");
        assert_eq!(expr.parts(), &[ExprPart::Attribute(ResourceRef::to("lake"))]);
    }

    #[test]
    fn lone_dollar_is_literal() {
        let expr = OutputExpr::parse("costs $5 at ${alb.dnsName}").expect("should parse");
        assert_eq!(
            expr.parts()[0],
            ExprPart::Literal("costs $5 at ".into()),
            "adjacent literals should be merged"
        );
    }

    #[test]
    fn unterminated_interpolation_fails() {
        let err = OutputExpr::parse("ssh ec2-user@${server.publicDnsName").unwrap_err();
        assert!(err.to_string().contains("malformed"), "got: {err}");
    }

    #[test]
    fn render_substitutes_attributes() {
        let expr = OutputExpr::parse("ssh ec2-user@${server.publicDnsName}").expect("parse");
        let rendered = expr.render(|r| format!("<{r}>"));
        assert_eq!(rendered, "ssh ec2-user@<server.publicDnsName>");
    }

    #[test]
    fn display_reproduces_source() {
        let source = "aws ssm start-session --target ${api-server.instanceId}";
        let expr = OutputExpr::parse(source).expect("parse");
        assert_eq!(expr.to_string(), source);
    }

    #[test]
    fn empty_expression_has_no_parts() {
        let expr = OutputExpr::parse("").expect("parse");
        assert!(expr.parts().is_empty());
    }
}
