use crate::commands::{
    context::ResolutionContext,
    node::NodeId,
    resolver::{starts_switch, Resolver},
};

impl<'a, E> Resolver<'a, E> {
    pub fn complete(
        &self,
        node: NodeId,
        input: Option<&str>,
        ctx: &mut ResolutionContext<'a, E>,
    ) -> Vec<String> {
        let mut input = input;

        if let Some(mut parser) = self.instantiate(node) {
            if parser.is_switch() {
                ctx.push_switch(parser);
            } else {
                if starts_switch(input) {
                    return self.complete_switches(Some(node), input, ctx);
                }

                input = match parser.parse(input) {
                    Ok(rest) => rest,
                    Err(_) => return Vec::new(),
                };

                // The cursor is on this token.
                if input.is_none() {
                    return parser.completions(ctx).to_vec();
                }

                if parser.result(ctx).is_err() {
                    return Vec::new();
                }
                ctx.push_parser(parser);
            }
        }

        let children = self.tree().children(node);
        if children.is_empty() && starts_switch(input) {
            return self.complete_switches(None, input, ctx);
        }

        children
            .iter()
            .flat_map(|&child| {
                let mut child_ctx = ctx.clone();
                self.complete(child, input, &mut child_ctx)
            })
            .collect()
    }

    fn complete_switches(
        &self,
        node: Option<NodeId>,
        input: Option<&str>,
        ctx: &mut ResolutionContext<'a, E>,
    ) -> Vec<String> {
        let mut input = input;

        while let Some(line) = input.and_then(|input| input.strip_prefix('-')) {
            let Some((flag, rest)) = line.split_once(' ') else {
                // Still typing the flag itself.
                return ctx
                    .switches()
                    .filter_map(|switch| {
                        switch
                            .descriptor()
                            .switch_aliases()
                            .find(|alias| alias.starts_with(line))
                    })
                    .map(|alias| format!("-{alias}"))
                    .take(ctx.completion_limit())
                    .collect();
            };

            let Some(mut switch) = ctx.take_switch(flag) else {
                return Vec::new();
            };
            input = match switch.parse(Some(rest)) {
                Ok(rest) => rest,
                Err(_) => return Vec::new(),
            };
            if input.is_none() {
                return switch.completions(ctx).to_vec();
            }
            ctx.consume_switch(switch);
        }

        match node {
            Some(node) => self.complete(node, input, ctx),
            None => Vec::new(),
        }
    }
}
