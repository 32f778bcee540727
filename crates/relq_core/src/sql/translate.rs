//! Predicate tree translation into parameterized SQL fragments.

use relq_driver::ScalarValue;

use crate::error::{CoreError, CoreResult};
use crate::query::{CompareOp, Filter, Operand};
use crate::sql::alias::AliasMap;
use crate::sql::params::{escape_like, ParamList};

/// Renders `filter` as a SQL fragment, binding constants into `params`.
///
/// Precedence is made explicit: every And/Or/Not node renders
/// parenthesized; comparison leaves render bare.
pub(crate) fn render_filter(
    filter: &Filter,
    aliases: &AliasMap,
    params: &mut ParamList,
) -> CoreResult<String> {
    match filter {
        Filter::And(left, right) => Ok(format!(
            "({} AND {})",
            render_filter(left, aliases, params)?,
            render_filter(right, aliases, params)?
        )),
        Filter::Or(left, right) => Ok(format!(
            "({} OR {})",
            render_filter(left, aliases, params)?,
            render_filter(right, aliases, params)?
        )),
        Filter::Not(inner) => Ok(format!("(NOT {})", render_filter(inner, aliases, params)?)),
        Filter::Compare { left, op, right } => render_compare(left, *op, right, aliases, params),
    }
}

fn render_compare(
    left: &Operand,
    op: CompareOp,
    right: &Operand,
    aliases: &AliasMap,
    params: &mut ParamList,
) -> CoreResult<String> {
    let symbol = match op {
        CompareOp::Contains => return render_like(left, right, "%", "%", aliases, params),
        CompareOp::StartsWith => return render_like(left, right, "", "%", aliases, params),
        CompareOp::EndsWith => return render_like(left, right, "%", "", aliases, params),
        CompareOp::Eq => "=",
        CompareOp::Ne => "<>",
        CompareOp::Lt => "<",
        CompareOp::Le => "<=",
        CompareOp::Gt => ">",
        CompareOp::Ge => ">=",
    };

    let null_left = matches!(left, Operand::Constant(ScalarValue::Null));
    let null_right = matches!(right, Operand::Constant(ScalarValue::Null));
    if null_left || null_right {
        let member_side = if null_left { right } else { left };
        let Operand::Member(path) = member_side else {
            return Err(CoreError::translation(
                "null comparison requires a member operand",
            ));
        };
        let (column, _) = aliases.resolve_member(path)?;
        return match op {
            CompareOp::Eq => Ok(format!("{column} IS NULL")),
            CompareOp::Ne => Ok(format!("{column} IS NOT NULL")),
            _ => Err(CoreError::translation(
                "ordering comparison against a null constant",
            )),
        };
    }

    let lhs = render_operand(left, aliases, params)?;
    let rhs = render_operand(right, aliases, params)?;
    Ok(format!("{lhs} {symbol} {rhs}"))
}

fn render_operand(
    operand: &Operand,
    aliases: &AliasMap,
    params: &mut ParamList,
) -> CoreResult<String> {
    match operand {
        Operand::Member(path) => Ok(aliases.resolve_member(path)?.0),
        Operand::Constant(value) => Ok(params.bind(value.clone())),
    }
}

fn render_like(
    member: &Operand,
    pattern: &Operand,
    prefix: &str,
    suffix: &str,
    aliases: &AliasMap,
    params: &mut ParamList,
) -> CoreResult<String> {
    let Operand::Member(path) = member else {
        return Err(CoreError::translation(
            "string operator requires a member on the left",
        ));
    };
    let Operand::Constant(value) = pattern else {
        return Err(CoreError::translation(
            "string operator pattern must be a constant",
        ));
    };
    let Some(needle) = value.as_text() else {
        return Err(CoreError::translation(
            "string operator pattern must be text",
        ));
    };
    let (column, _) = aliases.resolve_member(path)?;
    let bound = params.bind(ScalarValue::Text(format!(
        "{prefix}{}{suffix}",
        escape_like(needle)
    )));
    Ok(format!("{column} LIKE {bound} ESCAPE '\\'"))
}
